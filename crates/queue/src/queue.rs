//! Status recording and prioritized dequeue.
//!
//! The store's `version_states` table holds the mechanism (rows, schedule
//! columns); this module holds the policy: which interval a failure earns,
//! and the order eligible work comes back out.

use crate::backoff::next_retry_interval;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use silo_store::{Database, EligibleState, Status};
use silo_version::{CanonicalVersion, VersionClass};
use std::collections::HashSet;
use time::UtcDateTime;

/// Modules with more packages than this are considered expensive and drop
/// to the lowest-priority bucket so they cannot starve cheap modules.
const LARGE_MODULE_THRESHOLD: u32 = 1500;

/// One unit of dequeued work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub module_path: String,
    pub version: String,
    pub status: Status,
    pub try_count: u32,
    pub unit_count: Option<u32>,
    pub is_latest: bool,
}

impl From<EligibleState> for PendingItem {
    fn from(eligible: EligibleState) -> Self {
        Self {
            module_path: eligible.state.module_path,
            version: eligible.state.version,
            status: eligible.state.status,
            try_count: eligible.state.try_count,
            unit_count: eligible.state.unit_count,
            is_latest: eligible.is_latest,
        }
    }
}

/// Durable work queue over the version-state ledger.
#[derive(Clone)]
pub struct Queue {
    db: Database,
}

impl Queue {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a newly observed version as pending work. Re-observing a
    /// version whose schedule is live is a no-op.
    pub async fn enqueue(&self, module_path: &str, version: &CanonicalVersion) -> Result<()> {
        self.enqueue_at(module_path, version, UtcDateTime::now()).await
    }

    async fn enqueue_at(&self, module_path: &str, version: &CanonicalVersion, now: UtcDateTime) -> Result<()> {
        let mut conn = self.db.pool().acquire().await.or_raise(|| ErrorKind::Store)?;
        silo_store::states::enqueue_state(&mut conn, module_path, version, now)
            .await
            .or_raise(|| ErrorKind::Store)
    }

    /// Record the outcome of one processing attempt.
    ///
    /// A [`Status::SoftFailure`] earns the next backoff interval (1 min
    /// doubling to a 1 h cap); every other status schedules nothing.
    pub async fn record(
        &self,
        module_path: &str,
        version: &str,
        status: Status,
        error_detail: Option<&str>,
    ) -> Result<()> {
        self.record_at(module_path, version, status, error_detail, UtcDateTime::now()).await
    }

    async fn record_at(
        &self,
        module_path: &str,
        version: &str,
        status: Status,
        error_detail: Option<&str>,
        now: UtcDateTime,
    ) -> Result<()> {
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        let previous = silo_store::states::get_state(&mut tx, module_path, version)
            .await
            .or_raise(|| ErrorKind::Store)?;
        let Some(previous) = previous else {
            exn::bail!(ErrorKind::UnknownItem);
        };
        let (interval_secs, next_eligible_at) = if status == Status::SoftFailure {
            let interval = next_retry_interval(previous.retry_interval);
            (Some(interval.as_secs()), now + interval)
        } else {
            (None, now)
        };
        silo_store::states::record_state(
            &mut tx,
            module_path,
            version,
            status,
            error_detail,
            interval_secs,
            now,
            next_eligible_at,
        )
        .await
        .or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::debug!(module_path, version, %status, try_count = previous.try_count + 1, "recorded outcome");
        Ok(())
    }

    /// Up to `limit` eligible items, highest priority first.
    ///
    /// Buckets, in order: latest release under the package threshold,
    /// latest prerelease under the threshold, every other version under
    /// the threshold, then oversized modules. Within a bucket, cheapest
    /// first, version descending on ties. Each module path contributes one
    /// item; leftover slots are filled from the low-priority buckets with
    /// the modules' further versions once the latest buckets are drained.
    pub async fn next_batch(&self, limit: usize) -> Result<Vec<PendingItem>> {
        self.next_batch_at(limit, UtcDateTime::now()).await
    }

    async fn next_batch_at(&self, limit: usize, now: UtcDateTime) -> Result<Vec<PendingItem>> {
        let mut conn = self.db.pool().acquire().await.or_raise(|| ErrorKind::Store)?;
        // A generous multiple of the batch size, so the cross-bucket
        // dedup and backfill still have enough candidates to choose from.
        let cap = u32::try_from(limit.saturating_mul(8).max(64)).unwrap_or(u32::MAX);
        let eligible = silo_store::states::eligible_states(&mut conn, now, cap)
            .await
            .or_raise(|| ErrorKind::Store)?;

        let mut buckets: [Vec<EligibleState>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        for item in eligible {
            buckets[bucket_index(&item)].push(item);
        }
        for bucket in &mut buckets {
            bucket.sort_by(|a, b| {
                estimated_cost(a)
                    .cmp(&estimated_cost(b))
                    .then_with(|| b.state.sort_key.cmp(&a.state.sort_key))
            });
        }

        let mut batch = Vec::new();
        let mut deferred = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for (index, bucket) in buckets.into_iter().enumerate() {
            for item in bucket {
                if seen.contains(item.state.module_path.as_str()) {
                    if index >= 2 {
                        deferred.push(item);
                    }
                    continue;
                }
                seen.insert(item.state.module_path.clone());
                batch.push(PendingItem::from(item));
            }
        }
        // Reached only once the latest-version buckets are fully consumed,
        // so repeating a module path here is allowed.
        batch.extend(deferred.into_iter().map(PendingItem::from));
        batch.truncate(limit);
        Ok(batch)
    }

    /// Make every version last processed before `cutoff` eligible again,
    /// terminal or not. Operator-facing: reprocess everything built by an
    /// old producer.
    pub async fn reset_before(&self, cutoff: UtcDateTime) -> Result<u64> {
        self.reset_before_at(cutoff, UtcDateTime::now()).await
    }

    async fn reset_before_at(&self, cutoff: UtcDateTime, now: UtcDateTime) -> Result<u64> {
        let mut conn = self.db.pool().acquire().await.or_raise(|| ErrorKind::Store)?;
        let reset = silo_store::states::reset_states_before(&mut conn, cutoff, now)
            .await
            .or_raise(|| ErrorKind::Store)?;
        tracing::info!(reset, "reset versions for reprocessing");
        Ok(reset)
    }
}

fn bucket_index(item: &EligibleState) -> usize {
    if item.state.unit_count.is_some_and(|count| count > LARGE_MODULE_THRESHOLD) {
        return 3;
    }
    match (item.is_latest, item.state.class) {
        (true, VersionClass::Release) => 0,
        (true, VersionClass::Prerelease) => 1,
        _ => 2,
    }
}

/// A version never ingested has no cached count; treat it as cheap so new
/// modules surface quickly.
fn estimated_cost(item: &EligibleState) -> u32 {
    item.state.unit_count.unwrap_or(0)
}
