//! Latest-good version resolution.

use crate::canonical::CanonicalVersion;
use std::cmp::Ordering;

/// One candidate version of a module path, as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMeta {
    pub module_path: String,
    pub version: CanonicalVersion,
}

impl VersionMeta {
    pub fn new(module_path: impl Into<String>, version: CanonicalVersion) -> Self {
        Self { module_path: module_path.into(), version }
    }

    /// Precedence between sibling candidates; greater means "more latest".
    ///
    /// Release before prerelease before pseudo, then version descending.
    /// Ties only occur across sibling module paths sharing a directory
    /// subtree; the longer (more specific) path wins, then lexical order.
    fn precedence(&self, other: &Self) -> Ordering {
        other
            .version
            .class()
            .rank()
            .cmp(&self.version.class().rank())
            .then_with(|| self.version.sort_key().cmp(other.version.sort_key()))
            .then_with(|| self.module_path.len().cmp(&other.module_path.len()))
            .then_with(|| other.module_path.cmp(&self.module_path))
    }
}

/// Resolve the latest-good version among `candidates`.
///
/// Retracted versions are filtered out first; if nothing survives there is
/// no good version and the caller must clear (not preserve) its pointer.
/// When the un-retracted cooked latest reported by upstream tooling is not
/// itself an incompatible major, incompatible candidates are demoted: a
/// compatible major line, once present, wins over an incompatible one
/// (mirroring dependency-resolution conventions).
pub fn resolve_latest<'a, F>(
    candidates: &'a [VersionMeta],
    retracted: F,
    cooked_latest: Option<&str>,
) -> Option<&'a VersionMeta>
where
    F: Fn(&str) -> bool,
{
    let surviving: Vec<&VersionMeta> =
        candidates.iter().filter(|c| !retracted(c.version.as_str())).collect();
    if surviving.is_empty() {
        return None;
    }

    let cooked_is_incompatible = cooked_latest
        .filter(|cooked| !retracted(cooked))
        .and_then(|cooked| CanonicalVersion::parse(cooked).ok())
        .is_some_and(|cooked| cooked.is_incompatible());
    let compatible: Vec<&VersionMeta> =
        surviving.iter().copied().filter(|c| !c.version.is_incompatible()).collect();
    // Demote incompatible majors, unless that would leave nothing to pick
    // (a module whose every tagged version predates the convention).
    let pool = if !cooked_is_incompatible && !compatible.is_empty() { compatible } else { surviving };

    pool.into_iter().max_by(|a, b| a.precedence(b))
}

/// The most recent observed version, ignoring retraction.
///
/// Display-only fallback for module paths whose versions are all retracted;
/// never feeds the good pointer or any derived table.
pub fn latest_observed(candidates: &[VersionMeta]) -> Option<&VersionMeta> {
    candidates.iter().max_by(|a, b| a.precedence(b))
}
