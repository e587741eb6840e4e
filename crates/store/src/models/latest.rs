use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use silo_version::Retractions;
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct LatestPointerRow {
    pub(crate) module_path: String,
    pub(crate) good_version: Option<String>,
    pub(crate) cooked_version: Option<String>,
    pub(crate) retracted: String,
    pub(crate) updated_at: i64,
}

/// The resolved latest-good version of one module path, plus the raw
/// inputs (cooked latest, retraction set) needed to recompute it.
///
/// `good_version` is `None` when every known version is retracted; the
/// pointer is cleared rather than left stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestPointer {
    pub module_path: String,
    pub good_version: Option<String>,
    pub cooked_version: Option<String>,
    pub retracted: Retractions,
    pub updated_at: UtcDateTime,
}

impl TryFrom<LatestPointerRow> for LatestPointer {
    type Error = Error;
    fn try_from(row: LatestPointerRow) -> Result<Self> {
        Ok(Self {
            module_path: row.module_path,
            good_version: row.good_version,
            cooked_version: row.cooked_version,
            retracted: serde_json::from_str(&row.retracted)
                .or_raise(|| ErrorKind::InvalidData("retraction list"))?,
            updated_at: UtcDateTime::from_unix_timestamp(row.updated_at)
                .or_raise(|| ErrorKind::InvalidData("update time"))?,
        })
    }
}
