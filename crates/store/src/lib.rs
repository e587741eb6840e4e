//! SQLite persistence for the ingestion pipeline.
//!
//! This crate owns the schema, the connection pool, and every query the
//! rest of the system runs. It is mechanism, not policy: write functions
//! take a plain connection so callers compose them into transactions, and
//! scheduling or resolution decisions live in `silo-queue` and
//! `silo-ingest`.
//!
//! # Architecture
//! Three groups of tables:
//! - **Entity graph**: interned paths, module versions, units, and their
//!   attached content (readmes, documentation, imports, licenses).
//! - **Coordination**: per-version processing state for the work queue,
//!   and the per-module latest-good pointer.
//! - **Derived read models**: search entries, module import edges, and the
//!   per-symbol since-version history.

mod db;
pub mod error;
pub mod latest;
mod lock;
pub mod maintenance;
mod models;
pub mod search;
pub mod states;
pub mod symbols;
pub mod versions;

pub use crate::db::Database;
pub use crate::lock::LockManager;
pub use crate::models::{EligibleState, LatestPointer, ModuleVersionMeta, Status, VersionState};
pub use crate::search::SearchEntry;
pub use crate::symbols::SymbolSighting;
