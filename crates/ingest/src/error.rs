//! Ingestion Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// What the producer or scheduler should do about a failed ingestion.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The graph is missing or malforms a required field. Retrying the same
    /// input is useless; the producer must resubmit a corrected graph.
    #[display("malformed module graph: {_0}")]
    MalformedInput(#[error(not(source))] &'static str),
    /// The store already holds unit or license paths this resubmission
    /// lacks. Accepting it would silently shrink a version that downstream
    /// consumers assume only ever grows.
    #[display("resubmission drops previously stored paths")]
    IncompleteResubmission,
    /// The underlying store failed; the work queue retries with backoff.
    #[display("store error")]
    Store,
    /// Read-path lookup on an absent module.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
