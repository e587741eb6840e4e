//! Retention sweeps for pseudo-version buildup.
//!
//! Modules fetched at arbitrary commits accumulate pseudo-versions without
//! bound. The sweep keeps the `keep` most recent pseudo-versions per module
//! and deletes the rest, but never a version a latest-good pointer or a
//! live search row still references. State rows whose version row is gone
//! are dropped in a second pass.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqliteConnection;

/// Delete unreferenced pseudo-versions beyond the `keep` most recent per
/// module path. Returns the number of version rows removed; child rows go
/// with them via foreign-key cascade.
pub async fn sweep_orphan_pseudo_versions(conn: &mut SqliteConnection, keep: u32) -> Result<u64> {
    let outcome = sqlx::query(include_str!("../queries/delete_orphan_pseudo_versions.sql"))
        .bind(i64::from(keep))
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(outcome.rows_affected())
}

/// Delete pseudo-version state rows left behind once their version row is
/// gone, so the queue stops rescheduling swept versions.
pub async fn sweep_orphan_pseudo_states(conn: &mut SqliteConnection) -> Result<u64> {
    let outcome = sqlx::query(include_str!("../queries/delete_orphan_pseudo_states.sql"))
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(outcome.rows_affected())
}
