//! Queue Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The underlying store failed; retrying might succeed.
    #[display("store error")]
    Store,
    /// Recording an outcome for a version that was never enqueued.
    #[display("unknown queue item")]
    UnknownItem,
}

impl ErrorKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
