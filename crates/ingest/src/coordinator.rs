//! The ingestion coordinator.
//!
//! One `ingest` call takes a fully materialized module graph from the
//! fetcher to durable storage: validate, consistency-check, write the
//! entity graph, then (under the module lock) recompute the latest-good
//! pointer and refresh the derived views if this version won.
//!
//! Validation and the consistency check run before the transaction and
//! fail fast. Everything after runs inside one transaction committed while
//! the module lock is held, so a failure at any point rolls back to the
//! prior state and concurrent ingestions of the same module path are fully
//! serialized.

use crate::error::{ErrorKind, Result};
use crate::validate::validate;
use exn::{OptionExt, ResultExt};
use silo_model::{BuildContext, LicenseFile, ModuleGraph, Unit};
use silo_store::{
    Database, LatestPointer, LockManager, SearchEntry, Status, SymbolSighting, latest, search,
    states, symbols, versions,
};
use silo_version::{CanonicalVersion, Retractions, VersionClass, resolve_latest};
use sqlx::SqliteConnection;
use std::collections::HashSet;
use std::sync::Arc;
use time::UtcDateTime;
use tracing::instrument;

/// Coordinates concurrent ingestion workers over one database.
#[derive(Clone)]
pub struct Coordinator {
    db: Database,
    locks: Arc<LockManager>,
}

impl Coordinator {
    pub fn new(db: Database, locks: Arc<LockManager>) -> Self {
        Self { db, locks }
    }

    /// Ingest one module graph. Returns whether the ingested version is the
    /// module's resolved latest-good version.
    ///
    /// Idempotent: re-ingesting an identical graph leaves identical state
    /// and returns the same answer. A resubmission may grow a version
    /// (strict superset of paths) but never shrink it.
    #[instrument(skip_all, fields(module_path = %graph.module_path, version = %graph.version))]
    pub async fn ingest(&self, graph: &ModuleGraph) -> Result<bool> {
        self.ingest_at(graph, UtcDateTime::now()).await
    }

    async fn ingest_at(&self, graph: &ModuleGraph, now: UtcDateTime) -> Result<bool> {
        let version = validate(graph)?;
        {
            let mut conn = self.db.pool().acquire().await.or_raise(|| ErrorKind::Store)?;
            consistency_check(&mut conn, graph).await?;
        }

        let mut tx = self.db.begin().await.or_raise(|| ErrorKind::Store)?;
        write_graph(&mut tx, graph, &version, now).await.or_raise(|| ErrorKind::Store)?;

        let module_path = graph.module_path.clone();
        let graph = graph.clone();
        let version_for_refresh = version.clone();
        let is_latest = self
            .locks
            .with_module_lock(tx, &module_path, move |tx| {
                Box::pin(async move { refresh_derived(tx, &graph, &version_for_refresh, now).await })
            })
            .await
            .or_raise(|| ErrorKind::Store)?;
        tracing::info!(is_latest, "ingested module version");
        Ok(is_latest)
    }

    /// The pinned good version (and retraction set) of one module path.
    ///
    /// `NotFound` uniformly, whether the module was never seen or its
    /// content is withheld.
    pub async fn resolve_latest_version(&self, module_path: &str) -> Result<LatestPointer> {
        let mut conn = self.db.pool().acquire().await.or_raise(|| ErrorKind::Store)?;
        latest::get_latest_pointer(&mut conn, module_path)
            .await
            .or_raise(|| ErrorKind::Store)?
            .ok_or_raise(|| ErrorKind::NotFound("module"))
    }
}

/// Reject resubmissions that drop unit or license paths the store already
/// holds for this exact (module path, version).
async fn consistency_check(conn: &mut SqliteConnection, graph: &ModuleGraph) -> Result<()> {
    let stored_units = versions::stored_unit_paths(conn, &graph.module_path, &graph.version)
        .await
        .or_raise(|| ErrorKind::Store)?;
    let incoming_units: HashSet<&str> = graph.units.iter().map(|u| u.path.as_str()).collect();
    if stored_units.iter().any(|p| !incoming_units.contains(p.as_str())) {
        exn::bail!(ErrorKind::IncompleteResubmission);
    }

    let stored_licenses = versions::stored_license_paths(conn, &graph.module_path, &graph.version)
        .await
        .or_raise(|| ErrorKind::Store)?;
    let incoming_licenses: HashSet<&str> = graph
        .units
        .iter()
        .flat_map(|u| u.licenses.iter())
        .map(|l| l.file_path.as_str())
        .collect();
    if stored_licenses.iter().any(|p| !incoming_licenses.contains(p.as_str())) {
        exn::bail!(ErrorKind::IncompleteResubmission);
    }
    Ok(())
}

/// Write the version's entity graph and its work-queue row.
///
/// Rows are written in path-sorted order so two transactions writing
/// versions of the same module acquire row locks in the same order. A unit
/// of a non-redistributable module keeps its structural rows but has its
/// textual content (readme body, doc synopsis and body) stripped; "exists
/// but content withheld" stays queryable.
async fn write_graph(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    graph: &ModuleGraph,
    version: &CanonicalVersion,
    now: UtcDateTime,
) -> silo_store::error::Result<()> {
    let module_version_id = versions::upsert_module_version(
        &mut **tx,
        &versions::NewModuleVersion {
            module_path: &graph.module_path,
            version,
            commit_time: graph.commit_time,
            has_manifest: graph.has_manifest,
            is_redistributable: graph.is_redistributable,
            source_info: graph.source_info.as_ref(),
        },
    )
    .await?;

    let mut licenses: Vec<&LicenseFile> = graph.units.iter().flat_map(|u| u.licenses.iter()).collect();
    licenses.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    licenses.dedup_by(|a, b| a.file_path == b.file_path);
    for license in licenses {
        versions::upsert_license(&mut **tx, module_version_id, &license.file_path, &license.types).await?;
    }

    let mut units: Vec<&Unit> = graph.units.iter().collect();
    units.sort_by(|a, b| a.path.cmp(&b.path));
    for unit in units {
        let path_id = versions::upsert_path(&mut **tx, &unit.path).await?;
        let mut license_types: Vec<String> =
            unit.licenses.iter().flat_map(|l| l.types.iter().cloned()).collect();
        license_types.sort_unstable();
        license_types.dedup();
        let unit_id = versions::upsert_unit(
            &mut **tx,
            &versions::NewUnit {
                module_version_id,
                path_id,
                name: &unit.name,
                is_redistributable: unit.is_redistributable,
                license_types: &license_types,
            },
        )
        .await?;

        let redistributable = graph.is_redistributable && unit.is_redistributable;
        if let Some(readme) = &unit.readme {
            let contents = if redistributable { readme.contents.as_str() } else { "" };
            versions::upsert_readme(&mut **tx, unit_id, &readme.file_path, contents).await?;
        }
        for doc in &unit.docs {
            let (synopsis, body) =
                if redistributable { (doc.synopsis.as_str(), doc.body.as_str()) } else { ("", "") };
            versions::upsert_documentation(&mut **tx, unit_id, doc.build_context, synopsis, body).await?;
        }
        let mut imports: Vec<&str> = unit.imports.iter().map(String::as_str).collect();
        imports.sort_unstable();
        imports.dedup();
        for import in imports {
            versions::insert_unit_import(&mut **tx, unit_id, import).await?;
        }
    }

    states::enqueue_state(&mut **tx, &graph.module_path, version, now).await?;
    let package_count = u32::try_from(graph.package_count()).unwrap_or(u32::MAX);
    states::set_unit_count(&mut **tx, &graph.module_path, version.as_str(), package_count).await?;
    Ok(())
}

/// Recompute the latest pointer and, when this version is latest, refresh
/// the derived views. Runs under the module lock.
///
/// The pointer is persisted unconditionally: retraction and compatibility
/// facts travel with every graph and can change the answer even when this
/// version loses.
async fn refresh_derived(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    graph: &ModuleGraph,
    version: &CanonicalVersion,
    now: UtcDateTime,
) -> silo_store::error::Result<bool> {
    let previous = latest::get_latest_pointer(&mut **tx, &graph.module_path).await?;
    let metas = versions::list_version_metas(&mut **tx, &graph.module_path).await?;
    let retractions = Retractions::from(graph.retracted.as_slice());
    let good = resolve_latest(&metas, |v| retractions.is_retracted(v), graph.cooked_latest.as_deref());
    let good_version = good.map(|m| m.version.as_str().to_string());
    latest::upsert_latest_pointer(
        &mut **tx,
        &graph.module_path,
        good_version.as_deref(),
        graph.cooked_latest.as_deref(),
        &retractions,
        now,
    )
    .await?;

    let is_latest = good_version.as_deref() == Some(version.as_str());
    if !is_latest {
        // The common case leaves the derived tables alone, but the
        // recompute can still move (or clear) the pointer when retraction
        // or compatibility facts changed; the derived rows must follow it.
        let previous_good = previous.and_then(|p| p.good_version);
        if previous_good != good_version {
            realign_derived(&mut **tx, &graph.module_path, good_version.as_deref()).await?;
        }
        return Ok(false);
    }

    // Prereleases and pseudo-versions are not stable milestones, and
    // incompatible majors live outside the module's compatible line; none
    // of them move "since" history.
    if version.class() == VersionClass::Release && !version.is_incompatible() {
        merge_symbol_history(&mut **tx, graph, version).await?;
    }

    let mut edges: Vec<(String, String)> = graph
        .units
        .iter()
        .flat_map(|unit| unit.imports.iter().map(|import| (unit.path.clone(), import.clone())))
        .collect();
    edges.sort();
    edges.dedup();
    search::replace_imports_for_module(&mut **tx, &graph.module_path, &edges).await?;

    // The alternative-path flag suppresses only the search surface; the
    // raw graph, the import edges, and the symbol ledger are unaffected.
    if module_is_alternative(&mut **tx, &graph.module_path).await? {
        let removed = search::delete_search_for_module(&mut **tx, &graph.module_path).await?;
        tracing::info!(module_path = %graph.module_path, removed, "alternative path, suppressed from search");
        return Ok(true);
    }

    let entries = search_entries(graph, version);
    search::replace_search_for_module(&mut **tx, &graph.module_path, &entries).await?;
    Ok(true)
}

/// A module path is alternative when its best-known version on the ledger
/// was flagged with a canonicalization conflict.
async fn module_is_alternative(
    conn: &mut SqliteConnection,
    module_path: &str,
) -> silo_store::error::Result<bool> {
    let best = states::get_best_state(conn, module_path).await?;
    Ok(best.is_some_and(|s| s.status == Status::AlternativePath))
}

/// Re-point the derived rows after the pointer moved without this
/// ingestion's version winning: rebuild them from the new good version's
/// stored entity graph, or drop them when every version is retracted.
async fn realign_derived(
    conn: &mut SqliteConnection,
    module_path: &str,
    good: Option<&str>,
) -> silo_store::error::Result<()> {
    match good {
        None => {
            search::delete_search_for_module(&mut *conn, module_path).await?;
            search::replace_imports_for_module(&mut *conn, module_path, &[]).await?;
        },
        Some(version) => {
            let edges = search::stored_import_edges(&mut *conn, module_path, version).await?;
            search::replace_imports_for_module(&mut *conn, module_path, &edges).await?;
            if module_is_alternative(&mut *conn, module_path).await? {
                search::delete_search_for_module(&mut *conn, module_path).await?;
            } else {
                let entries = search::stored_search_entries(&mut *conn, module_path, version).await?;
                search::replace_search_for_module(&mut *conn, module_path, &entries).await?;
            }
        },
    }
    tracing::info!(module_path, good = good.unwrap_or("none"), "derived rows re-pointed");
    Ok(())
}

async fn merge_symbol_history(
    conn: &mut SqliteConnection,
    graph: &ModuleGraph,
    version: &CanonicalVersion,
) -> silo_store::error::Result<()> {
    let mut packages: Vec<&Unit> = graph.units.iter().filter(|u| u.is_package()).collect();
    packages.sort_by(|a, b| a.path.cmp(&b.path));
    for package in packages {
        let path_id = versions::upsert_path(conn, &package.path).await?;
        for symbol in &package.symbols {
            for context in &symbol.build_contexts {
                let sighting = SymbolSighting {
                    package_path_id: path_id,
                    name: &symbol.name,
                    parent: &symbol.parent,
                    build_context: *context,
                };
                symbols::merge_symbol(conn, &sighting, version).await?;
            }
        }
    }
    Ok(())
}

/// One search row per package, synopsis withheld when not redistributable.
fn search_entries(graph: &ModuleGraph, version: &CanonicalVersion) -> Vec<SearchEntry> {
    let mut entries: Vec<SearchEntry> = graph
        .units
        .iter()
        .filter(|u| u.is_package())
        .map(|unit| {
            let redistributable = graph.is_redistributable && unit.is_redistributable;
            let synopsis = if redistributable {
                unit.docs
                    .iter()
                    .find(|d| d.build_context == BuildContext::All)
                    .or_else(|| unit.docs.first())
                    .map(|d| d.synopsis.clone())
                    .unwrap_or_default()
            } else {
                String::new()
            };
            SearchEntry {
                package_path: unit.path.clone(),
                module_path: graph.module_path.clone(),
                version: version.as_str().to_string(),
                name: unit.name.clone(),
                synopsis,
                is_redistributable: redistributable,
            }
        })
        .collect();
    entries.sort_by(|a, b| a.package_path.cmp(&b.package_path));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use silo_model::{Documentation, Readme, SymbolMeta};

    fn at(secs: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(secs).unwrap()
    }

    async fn coordinator() -> Coordinator {
        let db = Database::connect_in_memory().await.unwrap();
        Coordinator::new(db, Arc::new(LockManager::new()))
    }

    fn package(path: &str, name: &str) -> Unit {
        Unit {
            path: path.to_string(),
            name: name.to_string(),
            is_redistributable: true,
            licenses: vec![LicenseFile { file_path: "LICENSE".to_string(), types: vec!["MIT".to_string()] }],
            readme: Some(Readme { file_path: "README.md".to_string(), contents: "hello".to_string() }),
            docs: vec![Documentation {
                build_context: BuildContext::All,
                synopsis: format!("package {name}"),
                body: "<p>docs</p>".to_string(),
            }],
            imports: vec!["example.com/dep".to_string()],
            symbols: vec![SymbolMeta {
                name: "Widget".to_string(),
                parent: String::new(),
                build_contexts: vec![BuildContext::All],
            }],
        }
    }

    fn graph(version: &str) -> ModuleGraph {
        ModuleGraph {
            module_path: "example.com/mod".to_string(),
            version: version.to_string(),
            commit_time: at(1700000000),
            has_manifest: true,
            is_redistributable: true,
            source_info: None,
            cooked_latest: Some(version.to_string()),
            retracted: vec![],
            units: vec![
                Unit {
                    path: "example.com/mod".to_string(),
                    name: String::new(),
                    is_redistributable: true,
                    licenses: vec![],
                    readme: None,
                    docs: vec![],
                    imports: vec![],
                    symbols: vec![],
                },
                package("example.com/mod/widget", "widget"),
            ],
        }
    }

    async fn search_rows(coordinator: &Coordinator, module_path: &str) -> Vec<SearchEntry> {
        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        search::list_search_for_module(&mut conn, module_path).await.unwrap()
    }

    #[tokio::test]
    async fn test_ingest_is_idempotent() {
        let coordinator = coordinator().await;
        let graph = graph("v1.0.0");
        assert!(coordinator.ingest_at(&graph, at(100)).await.unwrap());
        let first = search_rows(&coordinator, "example.com/mod").await;
        assert!(coordinator.ingest_at(&graph, at(200)).await.unwrap());
        let second = search_rows(&coordinator, "example.com/mod").await;
        assert_eq!(first, second);

        let pointer = coordinator.resolve_latest_version("example.com/mod").await.unwrap();
        assert_eq!(pointer.good_version.as_deref(), Some("v1.0.0"));
    }

    #[tokio::test]
    async fn test_incomplete_resubmission_is_rejected() {
        let coordinator = coordinator().await;
        let full = graph("v1.0.0");
        coordinator.ingest_at(&full, at(100)).await.unwrap();

        let mut shrunk = full.clone();
        shrunk.units.pop();
        let outcome = coordinator.ingest_at(&shrunk, at(200)).await;
        assert!(outcome.is_err());

        // A strict superset is a legitimate re-ingestion.
        let mut grown = full.clone();
        grown.units.push(package("example.com/mod/extra", "extra"));
        assert!(coordinator.ingest_at(&grown, at(300)).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_latest_leaves_derived_tables_alone() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v2.0.0"), at(100)).await.unwrap();
        let before = search_rows(&coordinator, "example.com/mod").await;

        let mut old = graph("v1.0.0");
        old.cooked_latest = Some("v2.0.0".to_string());
        assert!(!coordinator.ingest_at(&old, at(200)).await.unwrap());
        let after = search_rows(&coordinator, "example.com/mod").await;
        assert_eq!(before, after);
        assert_eq!(after[0].version, "v2.0.0");
    }

    #[tokio::test]
    async fn test_retraction_clears_the_pointer() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v1.0.0"), at(100)).await.unwrap();

        let mut retracting = graph("v1.0.0");
        retracting.retracted = vec!["v1.0.0".to_string()];
        retracting.cooked_latest = None;
        assert!(!coordinator.ingest_at(&retracting, at(200)).await.unwrap());
        let pointer = coordinator.resolve_latest_version("example.com/mod").await.unwrap();
        assert_eq!(pointer.good_version, None);
        assert!(pointer.retracted.is_retracted("v1.0.0"));
    }

    #[tokio::test]
    async fn test_search_rows_follow_cleared_pointer() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v1.0.0"), at(100)).await.unwrap();
        assert!(!search_rows(&coordinator, "example.com/mod").await.is_empty());

        // The retraction makes every known version bad; the ingested
        // version no longer wins, yet the derived rows must still empty out.
        let mut retracting = graph("v1.0.0");
        retracting.retracted = vec!["v1.0.0".to_string()];
        retracting.cooked_latest = None;
        assert!(!coordinator.ingest_at(&retracting, at(200)).await.unwrap());

        let pointer = coordinator.resolve_latest_version("example.com/mod").await.unwrap();
        assert_eq!(pointer.good_version, None);
        assert!(search_rows(&coordinator, "example.com/mod").await.is_empty());
        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        assert!(search::list_imports_for_module(&mut conn, "example.com/mod").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_derived_rows_follow_a_moved_pointer() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v1.0.0"), at(100)).await.unwrap();
        let mut middle = graph("v1.1.0");
        middle.units[1].imports = vec!["example.com/middep".to_string()];
        coordinator.ingest_at(&middle, at(200)).await.unwrap();
        coordinator.ingest_at(&graph("v1.2.0"), at(300)).await.unwrap();

        // A stale version arrives carrying a retraction of the current
        // latest; the pointer falls back to v1.1.0, whose graph exists only
        // in the store.
        let mut stale = graph("v1.0.0");
        stale.retracted = vec!["v1.2.0".to_string()];
        stale.cooked_latest = None;
        assert!(!coordinator.ingest_at(&stale, at(400)).await.unwrap());

        let pointer = coordinator.resolve_latest_version("example.com/mod").await.unwrap();
        assert_eq!(pointer.good_version.as_deref(), Some("v1.1.0"));
        let entries = search_rows(&coordinator, "example.com/mod").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version, "v1.1.0");
        assert_eq!(entries[0].synopsis, "package widget");
        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        let edges = search::list_imports_for_module(&mut conn, "example.com/mod").await.unwrap();
        assert_eq!(edges, vec![("example.com/mod/widget".to_string(), "example.com/middep".to_string())]);
    }

    #[tokio::test]
    async fn test_alternative_path_is_suppressed_from_search() {
        let coordinator = coordinator().await;
        let graph = graph("v1.0.0");
        coordinator.ingest_at(&graph, at(100)).await.unwrap();
        assert!(!search_rows(&coordinator, "example.com/mod").await.is_empty());

        {
            let mut conn = coordinator.db.pool().acquire().await.unwrap();
            states::record_state(
                &mut conn,
                "example.com/mod",
                "v1.0.0",
                Status::AlternativePath,
                Some("canonical path is example.com/Mod"),
                None,
                at(150),
                at(150),
            )
            .await
            .unwrap();
        }

        // Re-ingestion still succeeds and still resolves latest, but the
        // search rows are gone while the raw graph stays queryable.
        assert!(coordinator.ingest_at(&graph, at(200)).await.unwrap());
        assert!(search_rows(&coordinator, "example.com/mod").await.is_empty());
        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        let stored = versions::get_module_version(&mut conn, "example.com/mod", "v1.0.0").await.unwrap();
        assert!(stored.is_some());

        // Suppression is scoped to the search surface; import edges and
        // symbol history still refresh for the winning version.
        let edges = search::list_imports_for_module(&mut conn, "example.com/mod").await.unwrap();
        assert!(!edges.is_empty());
        let since = symbols::get_symbol_since(
            &mut conn,
            "example.com/mod/widget",
            "Widget",
            "",
            BuildContext::All,
        )
        .await
        .unwrap();
        assert_eq!(since.as_deref(), Some("v1.0.0"));
    }

    #[tokio::test]
    async fn test_redistributability_stripping_keeps_structure() {
        let coordinator = coordinator().await;
        let mut graph = graph("v1.0.0");
        graph.is_redistributable = false;
        coordinator.ingest_at(&graph, at(100)).await.unwrap();

        {
            let mut conn = coordinator.db.pool().acquire().await.unwrap();
            let (_, contents) =
                versions::get_readme(&mut conn, "example.com/mod", "v1.0.0", "example.com/mod/widget")
                    .await
                    .unwrap()
                    .unwrap();
            assert_eq!(contents, "");
            let docs =
                versions::get_documentation(&mut conn, "example.com/mod", "v1.0.0", "example.com/mod/widget")
                    .await
                    .unwrap();
            assert_eq!(docs, vec![("all".to_string(), String::new(), String::new())]);

            // Structural rows survive: the unit row, its licenses, the search row.
            let stored = versions::stored_unit_paths(&mut conn, "example.com/mod", "v1.0.0").await.unwrap();
            assert_eq!(stored.len(), 2);
        }
        let entries = search_rows(&coordinator, "example.com/mod").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].synopsis, "");
        assert!(!entries[0].is_redistributable);
    }

    #[tokio::test]
    async fn test_latest_release_merges_symbol_history() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v2.0.0"), at(100)).await.unwrap();

        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        let since = symbols::get_symbol_since(
            &mut conn,
            "example.com/mod/widget",
            "Widget",
            "",
            BuildContext::All,
        )
        .await
        .unwrap();
        assert_eq!(since.as_deref(), Some("v2.0.0"));
    }

    #[tokio::test]
    async fn test_prerelease_does_not_touch_symbol_history() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v1.0.0-rc.1"), at(100)).await.unwrap();

        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        let since = symbols::get_symbol_since(
            &mut conn,
            "example.com/mod/widget",
            "Widget",
            "",
            BuildContext::All,
        )
        .await
        .unwrap();
        assert_eq!(since, None);
    }

    #[tokio::test]
    async fn test_import_edges_follow_the_latest_version() {
        let coordinator = coordinator().await;
        coordinator.ingest_at(&graph("v1.0.0"), at(100)).await.unwrap();

        let mut newer = graph("v1.1.0");
        newer.units[1].imports = vec!["example.com/newdep".to_string()];
        coordinator.ingest_at(&newer, at(200)).await.unwrap();

        let mut conn = coordinator.db.pool().acquire().await.unwrap();
        let edges = search::list_imports_for_module(&mut conn, "example.com/mod").await.unwrap();
        assert_eq!(edges, vec![("example.com/mod/widget".to_string(), "example.com/newdep".to_string())]);
    }

    #[tokio::test]
    async fn test_resolving_an_unknown_module_is_not_found() {
        let coordinator = coordinator().await;
        assert!(coordinator.resolve_latest_version("example.com/ghost").await.is_err());
    }
}
