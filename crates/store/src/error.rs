//! Store Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, mirroring the per-crate error convention used across
//! the workspace.

use derive_more::{Display, Error};

/// A store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. `Database` covers connection, serialization, and lock-wait
/// failures from the underlying store; the work queue retries those with
/// backoff rather than surfacing them as data-level failures.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// Read-path lookup on an absent row. Deliberately uniform: callers
    /// cannot tell "never existed" from "withheld by license screening".
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] &'static str),
    /// A stored value did not round-trip into its domain type.
    #[display("invalid stored data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
