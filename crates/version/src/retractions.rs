use serde::{Deserialize, Serialize};

/// The set of versions a module's publisher has retracted.
///
/// Derived from manifest data by the fetcher and persisted verbatim (JSON)
/// on the module's latest-pointer row, so the latest-good version can be
/// recomputed without refetching the manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Retractions(Vec<String>);

impl Retractions {
    pub fn new(versions: Vec<String>) -> Self {
        Self(versions)
    }

    pub fn is_retracted(&self, version: &str) -> bool {
        self.0.iter().any(|v| v == version)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[String]> for Retractions {
    fn from(versions: &[String]) -> Self {
        Self(versions.to_vec())
    }
}
