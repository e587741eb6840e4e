//! Domain types for the module entity graph.
//!
//! A [`ModuleGraph`] is the fully-built, in-memory representation of one
//! version of one module, as handed over by the fetcher: module-level
//! metadata plus every [`Unit`] (the module root, directories, and packages)
//! with its licenses, readme, documentation, imports, and exported symbols.
//!
//! This crate is pure data; validation and persistence live in `silo-ingest`
//! and `silo-store` respectively.

mod build_context;
mod graph;
mod unit;

pub use crate::build_context::{BuildContext, ParseBuildContextError};
pub use crate::graph::{ModuleGraph, SourceInfo};
pub use crate::unit::{Documentation, LicenseFile, Readme, SymbolMeta, Unit};

/// Module path of the standard library pseudo-module.
///
/// The standard library is ingested through the same pipeline as ordinary
/// modules but its versions do not follow semver syntax, so validation
/// exempts this path.
pub const STDLIB_MODULE_PATH: &str = "std";
