//! Version ordering and latest-good resolution.
//!
//! Pure comparator/ranking logic for the versions of one module path:
//! canonical `vX.Y.Z` parsing, version classes (release, prerelease,
//! pseudo), incompatible-major demotion, retraction filtering, and the
//! lexically-orderable sort keys the store persists so that SQL `ORDER BY`
//! agrees with in-memory ordering. No I/O happens here.

mod canonical;
pub mod error;
mod resolve;
mod retractions;
mod sort;

pub use crate::canonical::{CanonicalVersion, VersionClass};
pub use crate::resolve::{VersionMeta, latest_observed, resolve_latest};
pub use crate::retractions::Retractions;
pub use crate::sort::sort_key;
