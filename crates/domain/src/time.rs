//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for manual-control expiry and invocation times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds since the Unix epoch, the storage representation.
#[must_use]
pub fn to_epoch_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}

/// Inverse of [`to_epoch_millis`]. `None` when out of range.
#[must_use]
pub fn from_epoch_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_epoch_millis_both_ways() {
        let ts = from_epoch_millis(1_700_000_600_000).unwrap();
        assert_eq!(to_epoch_millis(ts), 1_700_000_600_000);
    }
}
