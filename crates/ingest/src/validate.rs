//! Pre-transaction graph validation.
//!
//! Everything here fails fast, before any write: a graph that trips these
//! checks is discarded and reported back to the producer, never retried
//! as-is.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use silo_model::{ModuleGraph, STDLIB_MODULE_PATH};
use silo_version::CanonicalVersion;

/// Validate the graph and canonicalize its version.
///
/// The standard-library pseudo-module is exempt from semver syntax: its
/// toolchain-flavored version strings are taken as-is.
pub(crate) fn validate(graph: &ModuleGraph) -> Result<CanonicalVersion> {
    if !well_formed_path(&graph.module_path) {
        exn::bail!(ErrorKind::MalformedInput("module path"));
    }
    if graph.version.is_empty() {
        exn::bail!(ErrorKind::MalformedInput("version"));
    }
    if graph.commit_time.unix_timestamp() == 0 {
        exn::bail!(ErrorKind::MalformedInput("commit time"));
    }
    if graph.units.is_empty() {
        exn::bail!(ErrorKind::MalformedInput("units"));
    }
    if !graph.units.iter().any(|u| u.path == graph.module_path) {
        exn::bail!(ErrorKind::MalformedInput("module root unit"));
    }
    for unit in &graph.units {
        if unit.path != graph.module_path
            && !(unit.path.starts_with(&graph.module_path)
                && unit.path.as_bytes().get(graph.module_path.len()) == Some(&b'/'))
        {
            exn::bail!(ErrorKind::MalformedInput("unit path outside module"));
        }
    }

    if graph.module_path == STDLIB_MODULE_PATH {
        return Ok(CanonicalVersion::stdlib(&graph.version));
    }
    CanonicalVersion::parse(&graph.version).or_raise(|| ErrorKind::MalformedInput("version"))
}

fn well_formed_path(path: &str) -> bool {
    !path.is_empty()
        && !path.split('/').any(|segment| segment.is_empty())
        && !path.chars().any(char::is_whitespace)
}
