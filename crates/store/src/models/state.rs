use crate::error::{Error, ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use silo_version::VersionClass;
use std::time::Duration;
use time::UtcDateTime;

/// Processing status of one (module path, version).
///
/// Persisted as an HTTP-flavored status code so operators can eyeball the
/// ledger. `AlternativePath` is terminal but not an error: the version was
/// stored, it just must never surface in search.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Observed but not yet processed.
    #[display("pending")]
    Pending,
    #[display("success")]
    Success,
    /// The module path disagrees with its manifest's canonical path.
    #[display("alternative path")]
    AlternativePath,
    /// The producer must fix and resubmit the graph; retrying as-is is useless.
    #[display("validation failure")]
    ValidationFailure,
    /// Transient store/network failure; retried with backoff.
    #[display("transient failure")]
    SoftFailure,
}

impl Status {
    pub fn code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Success => 200,
            Self::AlternativePath => 480,
            Self::ValidationFailure => 490,
            Self::SoftFailure => 503,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::Pending),
            200 => Ok(Self::Success),
            480 => Ok(Self::AlternativePath),
            490 => Ok(Self::ValidationFailure),
            503 => Ok(Self::SoftFailure),
            _ => exn::bail!(ErrorKind::InvalidData("status code")),
        }
    }

    /// Terminal statuses are never re-dequeued (until an operator reset).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::AlternativePath | Self::ValidationFailure)
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct VersionStateRow {
    pub(crate) module_path: String,
    pub(crate) version: String,
    pub(crate) sort_key: String,
    pub(crate) version_class: String,
    pub(crate) status: i64,
    pub(crate) error_detail: Option<String>,
    pub(crate) try_count: i64,
    pub(crate) retry_interval_secs: Option<i64>,
    pub(crate) last_processed_at: Option<i64>,
    pub(crate) next_eligible_at: i64,
    pub(crate) unit_count: Option<i64>,
    pub(crate) created_at: i64,
}

/// Durable work-queue state for one (module path, version).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionState {
    pub module_path: String,
    pub version: String,
    pub sort_key: String,
    pub class: VersionClass,
    pub status: Status,
    pub error_detail: Option<String>,
    pub try_count: u32,
    /// Backoff interval applied by the most recent failure, if any.
    pub retry_interval: Option<Duration>,
    pub last_processed_at: Option<UtcDateTime>,
    pub next_eligible_at: UtcDateTime,
    /// Approximate package count, cached at ingest time for scheduling.
    pub unit_count: Option<u32>,
    pub created_at: UtcDateTime,
}

fn timestamp(secs: i64, what: &'static str) -> Result<UtcDateTime> {
    UtcDateTime::from_unix_timestamp(secs).or_raise(|| ErrorKind::InvalidData(what))
}

impl TryFrom<VersionStateRow> for VersionState {
    type Error = Error;
    fn try_from(row: VersionStateRow) -> Result<Self> {
        Ok(Self {
            module_path: row.module_path,
            version: row.version,
            sort_key: row.sort_key,
            class: row.version_class.parse::<VersionClass>().or_raise(|| ErrorKind::InvalidData("version class"))?,
            status: Status::from_code(row.status)?,
            error_detail: row.error_detail,
            try_count: u32::try_from(row.try_count).or_raise(|| ErrorKind::InvalidData("try count"))?,
            retry_interval: row
                .retry_interval_secs
                .map(|s| u64::try_from(s).or_raise(|| ErrorKind::InvalidData("retry interval")))
                .transpose()?
                .map(Duration::from_secs),
            last_processed_at: row.last_processed_at.map(|t| timestamp(t, "last processed time")).transpose()?,
            next_eligible_at: timestamp(row.next_eligible_at, "next eligible time")?,
            unit_count: row
                .unit_count
                .map(|c| u32::try_from(c).or_raise(|| ErrorKind::InvalidData("unit count")))
                .transpose()?,
            created_at: timestamp(row.created_at, "creation time")?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EligibleStateRow {
    #[sqlx(flatten)]
    pub(crate) state: VersionStateRow,
    pub(crate) recency_rank: i64,
}

/// A dequeue candidate: its state plus whether it is the most recent
/// version its module path has on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleState {
    pub state: VersionState,
    pub is_latest: bool,
}

impl TryFrom<EligibleStateRow> for EligibleState {
    type Error = Error;
    fn try_from(row: EligibleStateRow) -> Result<Self> {
        Ok(Self { state: VersionState::try_from(row.state)?, is_latest: row.recency_rank == 1 })
    }
}
