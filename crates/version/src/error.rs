//! Version Error Types

use derive_more::{Display, Error};

/// A version error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for version operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The input is not a canonical `vX.Y.Z[-pre][+build]` version.
    #[display("not a canonical version: {_0:?}")]
    Syntax(#[error(not(source))] String),
    /// The stored version-class label is not one we recognize.
    #[display("unrecognized version class: {_0:?}")]
    UnknownClass(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
