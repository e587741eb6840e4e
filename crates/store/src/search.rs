//! Derived read-model rows: search entries and module-level import edges.
//!
//! Both tables hold at most one generation of rows per module, refreshed
//! wholesale (delete then insert) when a new latest-good version lands.
//! Refresh runs inside the coordinator's transaction, so readers never
//! observe a half-replaced generation.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqliteConnection;

/// One searchable package row, keyed by package path.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SearchEntry {
    pub package_path: String,
    pub module_path: String,
    pub version: String,
    pub name: String,
    pub synopsis: String,
    #[sqlx(rename = "redistributable")]
    pub is_redistributable: bool,
}

/// Drop every search row currently attributed to `module_path`.
pub async fn delete_search_for_module(conn: &mut SqliteConnection, module_path: &str) -> Result<u64> {
    let outcome = sqlx::query(include_str!("../queries/delete_search_for_module.sql"))
        .bind(module_path)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(outcome.rows_affected())
}

/// Replace the module's search generation with `entries`.
///
/// Upserting by package path means a nested module that takes over a
/// package path steals the row from its former owner, keeping the
/// one-live-row-per-package invariant without a global rebuild.
pub async fn replace_search_for_module(
    conn: &mut SqliteConnection,
    module_path: &str,
    entries: &[SearchEntry],
) -> Result<()> {
    delete_search_for_module(conn, module_path).await?;
    for entry in entries {
        sqlx::query(include_str!("../queries/upsert_search_entry.sql"))
            .bind(&entry.package_path)
            .bind(&entry.module_path)
            .bind(&entry.version)
            .bind(&entry.name)
            .bind(&entry.synopsis)
            .bind(entry.is_redistributable)
            .execute(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
    }
    Ok(())
}

/// Current search generation of one module, sorted by package path.
pub async fn list_search_for_module(conn: &mut SqliteConnection, module_path: &str) -> Result<Vec<SearchEntry>> {
    sqlx::query_as(include_str!("../queries/list_search_for_module.sql"))
        .bind(module_path)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Search rows for one already-stored version, rebuilt from its entity
/// graph. Synopses come back as persisted, so content withheld at write
/// time stays withheld here.
///
/// Lets the coordinator re-point the derived rows when a recompute moves
/// the good version to one whose graph is no longer in hand.
pub async fn stored_search_entries(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Vec<SearchEntry>> {
    sqlx::query_as(include_str!("../queries/stored_search_entries.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Import edges of one already-stored version, rebuilt from its entity
/// graph.
pub async fn stored_import_edges(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Vec<(String, String)>> {
    sqlx::query_as(include_str!("../queries/stored_import_edges.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Replace the module's outgoing import edges with those of its new
/// latest-good version. Edges are (importing unit path, imported path)
/// pairs already deduplicated by the caller's graph.
pub async fn replace_imports_for_module(
    conn: &mut SqliteConnection,
    module_path: &str,
    edges: &[(String, String)],
) -> Result<()> {
    sqlx::query(include_str!("../queries/delete_imports_for_module.sql"))
        .bind(module_path)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    for (from_path, to_path) in edges {
        sqlx::query(include_str!("../queries/insert_import_edge.sql"))
            .bind(module_path)
            .bind(from_path)
            .bind(to_path)
            .execute(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
    }
    Ok(())
}

/// Current import edges of one module, sorted.
pub async fn list_imports_for_module(
    conn: &mut SqliteConnection,
    module_path: &str,
) -> Result<Vec<(String, String)>> {
    sqlx::query_as(include_str!("../queries/list_imports_for_module.sql"))
        .bind(module_path)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}
