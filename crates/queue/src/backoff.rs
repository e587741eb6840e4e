//! Geometric backoff schedule for retryable failures.

use std::time::Duration;

/// Delay applied by the first failure.
const INITIAL_INTERVAL: Duration = Duration::from_secs(60);
/// Retries never spread further apart than this.
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// The interval to apply after a retryable failure, given the interval the
/// previous failure applied (if any).
///
/// Doubles on every failure up to the hourly cap: 1 min, 2 min, 4 min, ...
/// 1 h, 1 h. The cap bounds retry storms without ever permanently starving
/// a broken version of re-attempts.
pub fn next_retry_interval(previous: Option<Duration>) -> Duration {
    match previous {
        None => INITIAL_INTERVAL,
        Some(prev) => (prev * 2).min(MAX_INTERVAL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::first_failure(None, 60)]
    #[case::doubles(Some(60), 120)]
    #[case::keeps_doubling(Some(240), 480)]
    #[case::reaches_cap(Some(1800), 3600)]
    #[case::saturates(Some(3600), 3600)]
    fn test_schedule(#[case] previous_secs: Option<u64>, #[case] expected_secs: u64) {
        let previous = previous_secs.map(Duration::from_secs);
        assert_eq!(next_retry_interval(previous), Duration::from_secs(expected_secs));
    }
}
