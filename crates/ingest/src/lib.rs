//! Ingestion coordination: the write path from a fetched module graph to
//! durable storage, plus the retention sweeper.
//!
//! The coordinator is the only writer of the latest-good pointer and the
//! derived search/import tables; everything it does to them happens under
//! the per-module lock, inside one transaction.

mod coordinator;
pub mod error;
mod sweep;
mod validate;

pub use crate::coordinator::Coordinator;
pub use crate::sweep::{DEFAULT_KEEP_PSEUDO, RetentionSweeper, SweepOutcome};
