//! Durable work-queue state rows.
//!
//! This module is mechanism only: it persists and fetches rows. Policy
//! (backoff arithmetic, dequeue bucketing) lives in `silo-queue`.

use crate::error::{ErrorKind, Result};
use crate::models::{EligibleState, EligibleStateRow, Status, VersionState, VersionStateRow};
use exn::ResultExt;
use silo_version::CanonicalVersion;
use sqlx::SqliteConnection;
use time::UtcDateTime;

/// Create the state row on first observation of a version. A row that
/// already exists is left untouched (its schedule is live).
pub async fn enqueue_state(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &CanonicalVersion,
    now: UtcDateTime,
) -> Result<()> {
    sqlx::query(include_str!("../queries/enqueue_state.sql"))
        .bind(module_path)
        .bind(version.as_str())
        .bind(version.sort_key())
        .bind(version.class().to_string())
        .bind(now.unix_timestamp())
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// Record the outcome of one processing attempt.
///
/// Increments the try count and stores the caller-computed backoff values;
/// returns [`ErrorKind::NotFound`] if the version was never enqueued.
pub async fn record_state(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
    status: Status,
    error_detail: Option<&str>,
    retry_interval_secs: Option<u64>,
    processed_at: UtcDateTime,
    next_eligible_at: UtcDateTime,
) -> Result<()> {
    let interval = retry_interval_secs
        .map(|s| i64::try_from(s).or_raise(|| ErrorKind::InvalidData("retry interval")))
        .transpose()?;
    let outcome = sqlx::query(include_str!("../queries/record_state.sql"))
        .bind(module_path)
        .bind(version)
        .bind(status.code())
        .bind(error_detail)
        .bind(interval)
        .bind(processed_at.unix_timestamp())
        .bind(next_eligible_at.unix_timestamp())
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if outcome.rows_affected() == 0 {
        exn::bail!(ErrorKind::NotFound("version state"));
    }
    Ok(())
}

pub async fn get_state(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
) -> Result<Option<VersionState>> {
    let row: Option<VersionStateRow> = sqlx::query_as(include_str!("../queries/get_state.sql"))
        .bind(module_path)
        .bind(version)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(VersionState::try_from).transpose()
}

/// The most recent version a module path has on the ledger, by class rank
/// then version order. Its status is what classifies the module path itself
/// (e.g. a best version flagged alternative marks the whole path).
pub async fn get_best_state(conn: &mut SqliteConnection, module_path: &str) -> Result<Option<VersionState>> {
    let row: Option<VersionStateRow> = sqlx::query_as(include_str!("../queries/get_best_state.sql"))
        .bind(module_path)
        .fetch_optional(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(VersionState::try_from).transpose()
}

/// Cache the approximate package count observed at ingest time.
pub async fn set_unit_count(
    conn: &mut SqliteConnection,
    module_path: &str,
    version: &str,
    unit_count: u32,
) -> Result<()> {
    sqlx::query(include_str!("../queries/set_unit_count.sql"))
        .bind(module_path)
        .bind(version)
        .bind(i64::from(unit_count))
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(())
}

/// State rows eligible for processing at `now`: pending or soft-failed,
/// with the next-eligible time reached. Terminal rows never come back
/// (until an operator reset).
///
/// At most `cap` rows are returned, best candidates first (latest versions,
/// then cheapest by cached unit count, then newest). `cap` bounds the
/// memory of a dequeue pass; callers ask for a generous multiple of their
/// batch size and apply the full scheduling policy to what comes back.
pub async fn eligible_states(
    conn: &mut SqliteConnection,
    now: UtcDateTime,
    cap: u32,
) -> Result<Vec<EligibleState>> {
    let rows: Vec<EligibleStateRow> = sqlx::query_as(include_str!("../queries/eligible_states.sql"))
        .bind(now.unix_timestamp())
        .bind(i64::from(cap))
        .fetch_all(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    rows.into_iter().map(EligibleState::try_from).collect()
}

/// Operator escape hatch: make every row last processed before `cutoff`
/// eligible again, clearing its backoff schedule.
pub async fn reset_states_before(
    conn: &mut SqliteConnection,
    cutoff: UtcDateTime,
    now: UtcDateTime,
) -> Result<u64> {
    let outcome = sqlx::query(include_str!("../queries/reset_states_before.sql"))
        .bind(cutoff.unix_timestamp())
        .bind(now.unix_timestamp())
        .execute(conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    Ok(outcome.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn at(secs: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(secs).unwrap()
    }

    #[tokio::test]
    async fn test_enqueue_is_first_observation_only() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let version = CanonicalVersion::parse("v1.0.0").unwrap();
        enqueue_state(&mut conn, "example.com/mod", &version, at(100)).await.unwrap();
        record_state(
            &mut conn,
            "example.com/mod",
            "v1.0.0",
            Status::SoftFailure,
            Some("connection reset"),
            Some(60),
            at(200),
            at(260),
        )
        .await
        .unwrap();
        // Re-observing the version must not clobber the live schedule.
        enqueue_state(&mut conn, "example.com/mod", &version, at(300)).await.unwrap();
        let state = get_state(&mut conn, "example.com/mod", "v1.0.0").await.unwrap().unwrap();
        assert_eq!(state.status, Status::SoftFailure);
        assert_eq!(state.try_count, 1);
        assert_eq!(state.next_eligible_at, at(260));
        drop(conn);
        db.close().await;
    }

    #[tokio::test]
    async fn test_record_without_enqueue_is_not_found() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let outcome = record_state(
            &mut conn,
            "example.com/ghost",
            "v1.0.0",
            Status::Success,
            None,
            None,
            at(100),
            at(100),
        )
        .await;
        assert!(outcome.is_err());
        drop(conn);
        db.close().await;
    }

    #[tokio::test]
    async fn test_eligibility_respects_schedule_and_terminality() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        for (path, raw) in [("example.com/a", "v1.0.0"), ("example.com/b", "v1.0.0"), ("example.com/c", "v1.0.0")] {
            let version = CanonicalVersion::parse(raw).unwrap();
            enqueue_state(&mut conn, path, &version, at(0)).await.unwrap();
        }
        // a: scheduled in the future; b: terminal; c: still pending.
        record_state(&mut conn, "example.com/a", "v1.0.0", Status::SoftFailure, None, Some(60), at(50), at(1000))
            .await
            .unwrap();
        record_state(&mut conn, "example.com/b", "v1.0.0", Status::Success, None, None, at(50), at(50))
            .await
            .unwrap();
        let eligible = eligible_states(&mut conn, at(100), 100).await.unwrap();
        let paths: Vec<&str> = eligible.iter().map(|e| e.state.module_path.as_str()).collect();
        assert_eq!(paths, vec!["example.com/c"]);
        // Once the backoff elapses, a is eligible again.
        let eligible = eligible_states(&mut conn, at(1000), 100).await.unwrap();
        assert_eq!(eligible.len(), 2);
        drop(conn);
        db.close().await;
    }

    #[tokio::test]
    async fn test_reset_before_cutoff() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        let version = CanonicalVersion::parse("v1.0.0").unwrap();
        enqueue_state(&mut conn, "example.com/mod", &version, at(0)).await.unwrap();
        record_state(&mut conn, "example.com/mod", "v1.0.0", Status::ValidationFailure, None, None, at(50), at(50))
            .await
            .unwrap();
        assert!(eligible_states(&mut conn, at(100), 100).await.unwrap().is_empty());
        let reset = reset_states_before(&mut conn, at(60), at(100)).await.unwrap();
        assert_eq!(reset, 1);
        let state = get_state(&mut conn, "example.com/mod", "v1.0.0").await.unwrap().unwrap();
        assert_eq!(state.status, Status::Pending);
        assert_eq!(state.try_count, 0);
        assert_eq!(eligible_states(&mut conn, at(100), 100).await.unwrap().len(), 1);
        drop(conn);
        db.close().await;
    }

    #[tokio::test]
    async fn test_eligible_cap_keeps_the_best_candidates() {
        let db = Database::connect_in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        // One module with an eligible latest and an eligible stale version,
        // plus a second module with a cheap latest.
        for raw in ["v1.0.0", "v1.1.0"] {
            let version = CanonicalVersion::parse(raw).unwrap();
            enqueue_state(&mut conn, "example.com/big", &version, at(0)).await.unwrap();
            set_unit_count(&mut conn, "example.com/big", raw, 900).await.unwrap();
        }
        let version = CanonicalVersion::parse("v0.3.0").unwrap();
        enqueue_state(&mut conn, "example.com/small", &version, at(0)).await.unwrap();
        set_unit_count(&mut conn, "example.com/small", "v0.3.0", 4).await.unwrap();

        // A cap of two keeps both modules' latest; the stale v1.0.0 is the
        // row that gets cut.
        let eligible = eligible_states(&mut conn, at(100), 2).await.unwrap();
        assert_eq!(eligible.len(), 2);
        assert!(eligible.iter().all(|e| e.is_latest));
        let versions: Vec<&str> = eligible.iter().map(|e| e.state.version.as_str()).collect();
        assert!(versions.contains(&"v1.1.0"));
        assert!(versions.contains(&"v0.3.0"));
        drop(conn);
        db.close().await;
    }
}
