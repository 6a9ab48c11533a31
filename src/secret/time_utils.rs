//! Time utilities for millisecond timestamp handling.
//!
//! Record timestamps are Unix milliseconds stored as `i64`. Arithmetic on
//! them saturates so that extreme TTLs never panic.

use std::time::{SystemTime, UNIX_EPOCH};

/// A function that provides the current time in Unix milliseconds.
pub type TimeProviderFn = Box<dyn Fn() -> i64 + Send + Sync>;

/// Get current timestamp in milliseconds since Unix epoch.
///
/// A system clock set before the epoch yields `0` rather than an error.
pub(crate) fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

/// Computes the expiry instant for a record created at `created_at`.
pub(crate) fn expiry_after(created_at: i64, ttl_seconds: u64) -> i64 {
    let ttl_millis = i64::try_from(ttl_seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    created_at.saturating_add(ttl_millis)
}

/// Converts a duration to whole milliseconds, saturating at `i64::MAX`.
pub(crate) fn duration_millis(duration: std::time::Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_current_timestamp_millis() {
        let ts = current_timestamp_millis();
        // Should be a reasonable timestamp (after year 2020)
        assert!(ts > 1_577_836_800_000);
    }

    #[test]
    fn test_expiry_after() {
        assert_eq!(expiry_after(1_000, 10), 11_000);
        assert_eq!(expiry_after(1_000, 0), 1_000);
    }

    #[test]
    fn test_expiry_after_saturates() {
        assert_eq!(expiry_after(1_000, u64::MAX), i64::MAX);
        assert_eq!(expiry_after(i64::MAX - 5, 1), i64::MAX);
    }

    #[test]
    fn test_duration_millis() {
        assert_eq!(duration_millis(Duration::from_secs(2)), 2_000);
        assert_eq!(duration_millis(Duration::MAX), i64::MAX);
    }
}
