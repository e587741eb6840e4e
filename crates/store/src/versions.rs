//! Entity-graph reads and writes: module versions, units, and their
//! attached content.
//!
//! Write functions take a plain [`SqliteConnection`] so the ingestion
//! coordinator can run them all inside one transaction; nothing here
//! begins or commits transactions itself.

use crate::error::{ErrorKind, Result};
use crate::models::{ModuleVersionMeta, ModuleVersionRow, VersionMetaRow};
use exn::ResultExt;
use silo_model::{BuildContext, SourceInfo};
use silo_version::{CanonicalVersion, VersionMeta};
use sqlx::SqliteConnection;
use time::UtcDateTime;

/// Intern a path string, returning its surrogate id.
///
/// The paths table is shared and append-only; the same path recurs across
/// versions and across the v1/series aliasing scheme.
pub async fn upsert_path(conn: &mut SqliteConnection, path: &str) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(include_str!("../queries/upsert_path.sql"))
        .bind(path)
        .fetch_one(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(id)
}

/// Module-level fields written by ingestion.
#[derive(Debug)]
pub struct NewModuleVersion<'a> {
    pub module_path: &'a str,
    pub version: &'a CanonicalVersion,
    pub commit_time: UtcDateTime,
    pub has_manifest: bool,
    pub is_redistributable: bool,
    pub source_info: Option<&'a SourceInfo>,
}

/// Upsert the module-version row, returning its id.
///
/// All columns are immutable per (module path, version) except
/// redistributability and source metadata, which a re-ingestion may
/// legitimately refresh.
pub async fn upsert_module_version(conn: &mut SqliteConnection, new: &NewModuleVersion<'_>) -> Result<i64> {
    let source_info = new
        .source_info
        .map(|s| serde_json::to_string(s).or_raise(|| ErrorKind::InvalidData("source info")))
        .transpose()?;
    let (id,): (i64,) = sqlx::query_as(include_str!("../queries/upsert_module_version.sql"))
        .bind(new.module_path)
        .bind(new.version.as_str())
        .bind(new.commit_time.unix_timestamp())
        .bind(new.version.sort_key())
        .bind(new.version.class().to_string())
        .bind(new.version.is_incompatible())
        .bind(new.has_manifest)
        .bind(new.is_redistributable)
        .bind(source_info)
        .fetch_one(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(id)
}

/// Unit-level fields written by ingestion.
#[derive(Debug)]
pub struct NewUnit<'a> {
    pub module_version_id: i64,
    pub path_id: i64,
    pub name: &'a str,
    pub is_redistributable: bool,
    pub license_types: &'a [String],
}

pub async fn upsert_unit(conn: &mut SqliteConnection, new: &NewUnit<'_>) -> Result<i64> {
    let license_types =
        serde_json::to_string(new.license_types).or_raise(|| ErrorKind::InvalidData("license types"))?;
    let (id,): (i64,) = sqlx::query_as(include_str!("../queries/upsert_unit.sql"))
        .bind(new.module_version_id)
        .bind(new.path_id)
        .bind(new.name)
        .bind(new.is_redistributable)
        .bind(license_types)
        .fetch_one(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(id)
}

pub async fn upsert_readme(
    conn: &mut SqliteConnection,
    unit_id: i64,
    file_path: &str,
    contents: &str,
) -> Result<()> {
    sqlx::query(include_str!("../queries/upsert_readme.sql"))
        .bind(unit_id)
        .bind(file_path)
        .bind(contents)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

pub async fn upsert_documentation(
    conn: &mut SqliteConnection,
    unit_id: i64,
    build_context: BuildContext,
    synopsis: &str,
    body: &str,
) -> Result<()> {
    sqlx::query(include_str!("../queries/upsert_documentation.sql"))
        .bind(unit_id)
        .bind(build_context.to_string())
        .bind(synopsis)
        .bind(body)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

pub async fn insert_unit_import(conn: &mut SqliteConnection, unit_id: i64, import_path: &str) -> Result<()> {
    sqlx::query(include_str!("../queries/insert_unit_import.sql"))
        .bind(unit_id)
        .bind(import_path)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

pub async fn upsert_license(
    conn: &mut SqliteConnection,
    module_version_id: i64,
    file_path: &str,
    types: &[String],
) -> Result<()> {
    let types = serde_json::to_string(types).or_raise(|| ErrorKind::InvalidData("license types"))?;
    sqlx::query(include_str!("../queries/upsert_license.sql"))
        .bind(module_version_id)
        .bind(file_path)
        .bind(types)
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Unit paths already stored for this exact (module path, version), sorted.
///
/// The consistency check compares these against an incoming graph: a
/// resubmission missing previously-seen paths is rejected upstream.
pub async fn stored_unit_paths(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar(include_str!("../queries/stored_unit_paths.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// License file paths already stored for this exact (module path, version).
pub async fn stored_license_paths(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar(include_str!("../queries/stored_license_paths.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Every stored version of a module path, in no particular order, carrying
/// the precomputed parts latest-good resolution needs.
pub async fn list_version_metas(conn: &mut SqliteConnection, module_path: &str) -> Result<Vec<VersionMeta>> {
    let rows: Vec<VersionMetaRow> = sqlx::query_as(include_str!("../queries/list_version_metas.sql"))
        .bind(module_path)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(VersionMeta::try_from).collect()
}

pub async fn get_module_version(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Option<ModuleVersionMeta>> {
    let row: Option<ModuleVersionRow> = sqlx::query_as(include_str!("../queries/get_module_version.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(ModuleVersionMeta::try_from).transpose()
}

/// Readme (file path, contents) of one unit, if stored.
pub async fn get_readme(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
    unit_path: &str,
) -> Result<Option<(String, String)>> {
    sqlx::query_as(include_str!("../queries/get_readme.sql"))
        .bind(module_path)
        .bind(version)
        .bind(unit_path)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Documentation rows (build context, synopsis, body) of one unit.
pub async fn get_documentation(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
    unit_path: &str,
) -> Result<Vec<(String, String, String)>> {
    sqlx::query_as(include_str!("../queries/get_documentation.sql"))
        .bind(module_path)
        .bind(version)
        .bind(unit_path)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}

/// Import list of one unit, sorted.
pub async fn get_unit_imports(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
    unit_path: &str,
) -> Result<Vec<String>> {
    sqlx::query_scalar(include_str!("../queries/get_unit_imports.sql"))
        .bind(module_path)
        .bind(version)
        .bind(unit_path)
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)
}
