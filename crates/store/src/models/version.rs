use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use silo_model::SourceInfo;
use silo_version::{CanonicalVersion, VersionClass, VersionMeta};
use time::UtcDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct ModuleVersionRow {
    pub(crate) module_path: String,
    pub(crate) version: String,
    pub(crate) commit_time: i64,
    pub(crate) sort_key: String,
    pub(crate) version_class: String,
    pub(crate) incompatible: i64,
    pub(crate) has_manifest: i64,
    pub(crate) redistributable: i64,
    pub(crate) source_info: Option<String>,
}

/// Module-level metadata for one stored version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleVersionMeta {
    pub module_path: String,
    pub version: CanonicalVersion,
    pub commit_time: UtcDateTime,
    pub has_manifest: bool,
    pub is_redistributable: bool,
    pub source_info: Option<SourceInfo>,
}

fn rehydrate_version(
    raw: String,
    class: &str,
    incompatible: i64,
    sort_key: String,
) -> Result<CanonicalVersion, Error> {
    let class = class.parse::<VersionClass>().or_raise(|| ErrorKind::InvalidData("version class"))?;
    Ok(CanonicalVersion::from_parts(raw, class, incompatible != 0, sort_key))
}

impl TryFrom<ModuleVersionRow> for ModuleVersionMeta {
    type Error = Error;
    fn try_from(row: ModuleVersionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            module_path: row.module_path,
            version: rehydrate_version(row.version, &row.version_class, row.incompatible, row.sort_key)?,
            commit_time: UtcDateTime::from_unix_timestamp(row.commit_time)
                .or_raise(|| ErrorKind::InvalidData("commit time"))?,
            has_manifest: row.has_manifest != 0,
            is_redistributable: row.redistributable != 0,
            source_info: row
                .source_info
                .map(|json| serde_json::from_str(&json).or_raise(|| ErrorKind::InvalidData("source info")))
                .transpose()?,
        })
    }
}

/// Slim row used by latest-good resolution; skips the columns ordering
/// doesn't need.
#[derive(sqlx::FromRow)]
pub(crate) struct VersionMetaRow {
    pub(crate) module_path: String,
    pub(crate) version: String,
    pub(crate) version_class: String,
    pub(crate) sort_key: String,
    pub(crate) incompatible: i64,
}

impl TryFrom<VersionMetaRow> for VersionMeta {
    type Error = Error;
    fn try_from(row: VersionMetaRow) -> Result<Self, Self::Error> {
        let version = rehydrate_version(row.version, &row.version_class, row.incompatible, row.sort_key)?;
        Ok(VersionMeta::new(row.module_path, version))
    }
}
