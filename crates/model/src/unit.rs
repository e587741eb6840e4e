use crate::build_context::BuildContext;
use serde::{Deserialize, Serialize};

/// A path inside a module: the module root, a directory, or a package.
///
/// Units are owned by exactly one module version. The same path string
/// recurs across versions (and across major-version path aliasing), so the
/// store deduplicates path strings behind surrogate ids; this in-memory type
/// always carries the full string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Full import path of the unit.
    pub path: String,
    /// Package name, empty for plain directories and most module roots.
    pub name: String,
    /// Whether this unit's derived content may be redistributed.
    pub is_redistributable: bool,
    /// License files that apply to this unit, nearest-first.
    pub licenses: Vec<LicenseFile>,
    pub readme: Option<Readme>,
    /// Rendered documentation, one entry per build context it differs in.
    pub docs: Vec<Documentation>,
    /// Import paths of packages this unit imports.
    pub imports: Vec<String>,
    /// Exported symbols declared by this unit.
    pub symbols: Vec<SymbolMeta>,
}

impl Unit {
    /// A unit is a package when it declares a package name.
    pub fn is_package(&self) -> bool {
        !self.name.is_empty()
    }
}

/// A detected license file and its classified types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseFile {
    /// Path of the license file relative to the module root.
    pub file_path: String,
    /// Detected license identifiers (e.g. `MIT`, `Apache-2.0`).
    pub types: Vec<String>,
}

/// A readme file belonging to a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    pub file_path: String,
    pub contents: String,
}

/// Rendered documentation for one build context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation {
    pub build_context: BuildContext,
    /// One-line package synopsis, also denormalized into the search index.
    pub synopsis: String,
    /// Rendered documentation body.
    pub body: String,
}

/// An exported symbol declared by a unit.
///
/// `parent` is the empty string for top-level symbols, or the name of the
/// owning type for methods and fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMeta {
    pub name: String,
    pub parent: String,
    /// Build contexts the symbol is present in.
    pub build_contexts: Vec<BuildContext>,
}
