use crate::error::{ErrorKind, Result};
use crate::sort;
use derive_more::Display;
use exn::{OptionExt, ResultExt};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// Matches the trailing `<timestamp>-<revision>` identifier that marks a
/// pseudo-version, e.g. `v0.0.0-20190101000000-abcdef123456`.
static PSEUDO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\.)[0-9]{14}-[0-9a-f]{12}$").unwrap());

/// Build-metadata marker on major versions that don't follow the
/// compatible-import-path convention.
const INCOMPATIBLE_BUILD: &str = "incompatible";

/// How stable a version is, for ordering purposes.
///
/// Releases outrank prereleases, which outrank pseudo-versions, regardless
/// of what plain semver comparison would say.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionClass {
    #[display("release")]
    Release,
    #[display("prerelease")]
    Prerelease,
    #[display("pseudo")]
    Pseudo,
}

impl VersionClass {
    /// Ordering rank; lower is better.
    pub fn rank(self) -> u8 {
        match self {
            Self::Release => 0,
            Self::Prerelease => 1,
            Self::Pseudo => 2,
        }
    }
}

impl FromStr for VersionClass {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "release" => Ok(Self::Release),
            "prerelease" => Ok(Self::Prerelease),
            "pseudo" => Ok(Self::Pseudo),
            other => exn::bail!(ErrorKind::UnknownClass(other.to_string())),
        }
    }
}

/// A module version in canonical form, with everything ordering needs
/// precomputed: its class, its incompatibility flag, and a sort key whose
/// lexical order matches version precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalVersion {
    raw: String,
    class: VersionClass,
    incompatible: bool,
    sort_key: String,
}

impl CanonicalVersion {
    /// Parse a canonical `vX.Y.Z[-pre][+build]` version string.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let bare = raw.strip_prefix('v').ok_or_raise(|| ErrorKind::Syntax(raw.clone()))?;
        let parsed = semver::Version::parse(bare).or_raise(|| ErrorKind::Syntax(raw.clone()))?;
        let class = if PSEUDO_RE.is_match(parsed.pre.as_str()) {
            VersionClass::Pseudo
        } else if !parsed.pre.is_empty() {
            VersionClass::Prerelease
        } else {
            VersionClass::Release
        };
        let incompatible = parsed.build.as_str() == INCOMPATIBLE_BUILD;
        let sort_key = sort::sort_key(&parsed);
        Ok(Self { raw, class, incompatible, sort_key })
    }

    /// Rehydrate a version from parts previously produced by [`parse`]
    /// (or [`stdlib`]) and persisted, without re-deriving them.
    ///
    /// [`parse`]: Self::parse
    /// [`stdlib`]: Self::stdlib
    pub fn from_parts(
        raw: impl Into<String>,
        class: VersionClass,
        incompatible: bool,
        sort_key: impl Into<String>,
    ) -> Self {
        Self { raw: raw.into(), class, incompatible, sort_key: sort_key.into() }
    }

    /// Accept a standard-library version verbatim.
    ///
    /// The stdlib pseudo-module does not use semver syntax; its versions
    /// are treated as releases and ordered by their raw string, which is
    /// good enough because toolchain versions share one uniform shape.
    pub fn stdlib(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let sort_key = raw.clone();
        Self { raw, class: VersionClass::Release, incompatible: false, sort_key }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn class(&self) -> VersionClass {
        self.class
    }

    /// Whether this is a `+incompatible` major version.
    pub fn is_incompatible(&self) -> bool {
        self.incompatible
    }

    /// Lexically-orderable precedence key; greater means newer.
    ///
    /// Only meaningful between versions of the same module path, and only
    /// within one [`VersionClass`] — class rank is compared first.
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }
}

impl AsRef<str> for CanonicalVersion {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
