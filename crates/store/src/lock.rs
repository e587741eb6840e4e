//! Per-module-path mutual exclusion.
//!
//! Ingestion workers share one process, so the named-lock primitive is an
//! in-process table of mutexes keyed by a stable, non-cryptographic hash of
//! the module path (crc32). Hash collisions are tolerated: two module paths
//! landing on the same shard serialize needlessly, but correctness never
//! depends on the mapping being injective.
//!
//! The lock is scope-bound to a transaction: [`LockManager::with_module_lock`]
//! consumes the transaction, runs the critical section, commits (or rolls
//! back on error), and only then releases the shard. There is no way to
//! release early and no way to hold the lock without a live transaction.
//! Contention blocks; it never fails. Waiters are admitted in no particular
//! order, but every waiter is eventually admitted (tokio mutexes queue
//! fairly enough for liveness).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::future::BoxFuture;
use sqlx::{Sqlite, Transaction};
use tokio::sync::Mutex;

/// Number of lock shards. Plenty for a worker pool of tens of tasks; the
/// occasional collision only costs extra serialization.
const SHARD_COUNT: usize = 512;

/// Keyed exclusive locks, one logical lock per module path.
pub struct LockManager {
    shards: Vec<Mutex<()>>,
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new()
    }
}

impl LockManager {
    pub fn new() -> Self {
        Self { shards: (0..SHARD_COUNT).map(|_| Mutex::new(())).collect() }
    }

    /// Stable shard index for a module path.
    fn shard_index(module_path: &str) -> usize {
        crc32fast::hash(module_path.as_bytes()) as usize % SHARD_COUNT
    }

    /// Run `f` while holding the exclusive lock for `module_path`, then
    /// commit the transaction.
    ///
    /// Two callers passing the same module path can never execute their
    /// bodies concurrently. The transaction is committed while the lock is
    /// still held; on error it is rolled back (dropped) before the lock is
    /// released, so a successor can never observe the failed writes.
    ///
    /// Taking the [`Transaction`] by value is what enforces the
    /// "only inside a transaction" contract at compile time: there is no
    /// overload that locks without one.
    pub async fn with_module_lock<'t, T, F>(
        &self,
        mut tx: Transaction<'t, Sqlite>,
        module_path: &str,
        f: F,
    ) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut Transaction<'t, Sqlite>) -> BoxFuture<'c, Result<T>>,
    {
        let shard = &self.shards[Self::shard_index(module_path)];
        let _guard = shard.lock().await;
        tracing::debug!(module_path, "module lock acquired");
        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.or_raise(|| ErrorKind::Database)?;
                Ok(value)
            },
            Err(e) => {
                // Dropping the transaction rolls it back; do so before the
                // guard goes out of scope so no waiter sees partial state.
                drop(tx);
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn file_backed_db(dir: &tempfile::TempDir) -> Database {
        Database::connect(dir.path().join("locks.db")).await.unwrap()
    }

    /// N concurrent lockers of the same module path: each body runs exactly
    /// once, no two bodies overlap, and all N complete.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mutual_exclusion_liveness() {
        const TASKS: usize = 8;
        let dir = tempfile::tempdir().unwrap();
        let db = file_backed_db(&dir).await;
        let locks = Arc::new(LockManager::new());
        let active = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..TASKS {
            let db = db.clone();
            let locks = Arc::clone(&locks);
            let active = Arc::clone(&active);
            let completed = Arc::clone(&completed);
            handles.push(tokio::spawn(async move {
                let tx = db.begin().await.unwrap();
                locks
                    .with_module_lock(tx, "example.com/contended", |_tx| {
                        let active = Arc::clone(&active);
                        let completed = Arc::clone(&completed);
                        Box::pin(async move {
                            let overlapping = active.fetch_add(1, Ordering::SeqCst);
                            assert_eq!(overlapping, 0, "two lock bodies overlapped");
                            tokio::time::sleep(Duration::from_millis(5)).await;
                            active.fetch_sub(1, Ordering::SeqCst);
                            completed.fetch_add(1, Ordering::SeqCst);
                            Ok(())
                        })
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(completed.load(Ordering::SeqCst), TASKS);
        db.close().await;
    }

    /// A failing body rolls the transaction back and releases the lock for
    /// the next caller.
    #[tokio::test]
    async fn test_failure_rolls_back_and_releases() {
        let dir = tempfile::tempdir().unwrap();
        let db = file_backed_db(&dir).await;
        let locks = LockManager::new();

        let tx = db.begin().await.unwrap();
        let failed: Result<()> = locks
            .with_module_lock(tx, "example.com/mod", |tx| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO paths (path) VALUES ('example.com/mod')")
                        .execute(&mut **tx)
                        .await
                        .or_raise(|| ErrorKind::Database)?;
                    exn::bail!(ErrorKind::Database);
                })
            })
            .await;
        assert!(failed.is_err());

        // Lock is free again and the failed insert was rolled back.
        let tx = db.begin().await.unwrap();
        let count = locks
            .with_module_lock(tx, "example.com/mod", |tx| {
                Box::pin(async move {
                    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM paths")
                        .fetch_one(&mut **tx)
                        .await
                        .or_raise(|| ErrorKind::Database)?;
                    Ok(row.0)
                })
            })
            .await
            .unwrap();
        assert_eq!(count, 0);
        db.close().await;
    }
}
