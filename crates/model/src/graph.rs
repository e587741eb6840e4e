use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

/// One version of one module, fully materialized by the fetcher.
///
/// This is the input to ingestion. The graph is self-contained: everything
/// the store needs to persist the version (and to recompute the module's
/// latest-good pointer) travels with it, so ingestion never reaches back to
/// the module proxy.
///
/// Module-level metadata is immutable per `(module_path, version)` once
/// written, except `is_redistributable` and `source_info` which may be
/// refreshed by re-ingesting the same version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGraph {
    /// Canonical import path of the module (e.g. `example.com/foo/bar`).
    pub module_path: String,
    /// Version string as reported upstream (e.g. `v1.2.3`).
    pub version: String,
    /// Commit time of the revision this version resolves to.
    pub commit_time: UtcDateTime,
    /// Whether the version ships a module manifest file.
    pub has_manifest: bool,
    /// Whether license screening allows redistributing derived content.
    pub is_redistributable: bool,
    /// Where the module source lives, for linking out of rendered docs.
    pub source_info: Option<SourceInfo>,
    /// The raw "latest" version reported by upstream tooling, before any
    /// retraction or compatibility rules are applied.
    pub cooked_latest: Option<String>,
    /// Versions the publisher has retracted via manifest data.
    pub retracted: Vec<String>,
    /// Every path in the module: the root, directories, and packages.
    pub units: Vec<Unit>,
}

impl ModuleGraph {
    /// Number of units that are packages (named, documented paths).
    ///
    /// Used as a cheap cost estimate for scheduling; directories without
    /// package content don't meaningfully add processing cost.
    pub fn package_count(&self) -> usize {
        self.units.iter().filter(|u| u.is_package()).count()
    }
}

/// Opaque source-location metadata attached to a module version.
///
/// Persisted as-is (JSON) and never interpreted by this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub repo_url: String,
    pub commit: String,
}
