//! Per-symbol "available since" history ledger.
//!
//! One row per (package path, symbol, parent, build context) holding the
//! earliest version the symbol is known to exist in. The merge rule is a
//! strict monotonic minimum: an out-of-order backfill of an older release
//! can lower a since-version, but nothing ever raises one — which also
//! makes re-merging the same version a no-op.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use silo_model::BuildContext;
use silo_version::CanonicalVersion;
use sqlx::SqliteConnection;

/// One (symbol, build context) sighting to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolSighting<'a> {
    pub package_path_id: i64,
    pub name: &'a str,
    pub parent: &'a str,
    pub build_context: BuildContext,
}

/// Merge one sighting observed in `version`.
///
/// Creates the record on first sighting; on conflict, updates only when
/// `version` sorts strictly earlier than the recorded since-version.
pub async fn merge_symbol(
    conn: &mut SqliteConnection,
    sighting: &SymbolSighting<'_>,
    version: &CanonicalVersion,
) -> Result<()> {
    sqlx::query(include_str!("../queries/merge_symbol.sql"))
        .bind(sighting.package_path_id)
        .bind(sighting.name)
        .bind(sighting.parent)
        .bind(sighting.build_context.to_string())
        .bind(version.as_str())
        .bind(version.sort_key())
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// The earliest version `name` (under `parent`) is known to exist in, for
/// one package path and build context.
pub async fn get_symbol_since(
    conn: &mut SqliteConnection,
    package_path: &str,
    name: &str,
    parent: &str,
    build_context: BuildContext,
) -> Result<Option<String>> {
    sqlx::query_scalar(include_str!("../queries/get_symbol_since.sql"))
        .bind(package_path)
        .bind(name)
        .bind(parent)
        .bind(build_context.to_string())
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}
