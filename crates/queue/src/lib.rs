//! Work-queue policy over the durable version-state ledger.
//!
//! Scheduling decisions live here: the geometric backoff schedule for
//! retryable failures and the bucketed priority order of [`Queue::next_batch`].
//! Persistence is delegated entirely to `silo-store`.

pub mod backoff;
pub mod error;
mod queue;

pub use crate::queue::{PendingItem, Queue};
pub use silo_store::Status;
