//! Latest-good pointer rows.
//!
//! One row per module path. Mutated only by the ingestion coordinator
//! while it holds the module lock; read freely by resolution and by the
//! search-index refresh step. The pointer is version-stamped in place (a
//! single row, updated transactionally) so concurrent readers never see a
//! torn value.

use crate::error::{ErrorKind, Result};
use crate::models::{LatestPointer, LatestPointerRow};
use exn::ResultExt;
use silo_version::Retractions;
use sqlx::SqliteConnection;
use time::UtcDateTime;

/// Persist the recomputed pointer, unconditionally.
///
/// `good` is `None` when every known version is retracted: the pointer is
/// cleared, never left stale.
pub async fn upsert_latest_pointer(
    conn: &mut SqliteConnection,
    module_path: &str,
    good: Option<&str>,
    cooked: Option<&str>,
    retracted: &Retractions,
    now: UtcDateTime,
) -> Result<()> {
    let retracted = serde_json::to_string(retracted).or_raise(|| ErrorKind::InvalidData("retraction list"))?;
    sqlx::query(include_str!("../queries/upsert_latest_pointer.sql"))
        .bind(module_path)
        .bind(good)
        .bind(cooked)
        .bind(retracted)
        .bind(now.unix_timestamp())
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

pub async fn get_latest_pointer(
    conn: &mut SqliteConnection,
    module_path: &str,
) -> Result<Option<LatestPointer>> {
    let row: Option<LatestPointerRow> = sqlx::query_as(include_str!("../queries/get_latest_pointer.sql"))
        .bind(module_path)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(LatestPointer::try_from).transpose()
}
