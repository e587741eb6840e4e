//! Retention sweeper for pseudo-version buildup.
//!
//! Runs independently of ingestion, on whatever cadence the operator
//! chooses. Each sweep is one transaction: version rows first, then the
//! state rows orphaned by their removal, so the queue stops rescheduling
//! swept versions.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use silo_store::{Database, maintenance};
use tracing::instrument;

/// Pseudo-versions kept per module path when no override is given.
pub const DEFAULT_KEEP_PSEUDO: u32 = 2;

/// What one sweep removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub versions_removed: u64,
    pub states_removed: u64,
}

pub struct RetentionSweeper {
    db: Database,
}

impl RetentionSweeper {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Remove unreferenced pseudo-versions beyond the `keep` most recent
    /// per module path, and the queue state left dangling by past sweeps.
    ///
    /// Versions the latest pointer or a live search row still references
    /// are never removed, whatever their age.
    #[instrument(skip(self))]
    pub async fn sweep(&self, keep: u32) -> Result<SweepOutcome> {
        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        let versions_removed =
            maintenance::sweep_orphan_pseudo_versions(&mut tx, keep).await.or_raise(|| ErrorKind::Store)?;
        let states_removed =
            maintenance::sweep_orphan_pseudo_states(&mut tx).await.or_raise(|| ErrorKind::Store)?;
        tx.commit().await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(versions_removed, states_removed, "retention sweep complete");
        Ok(SweepOutcome { versions_removed, states_removed })
    }
}
