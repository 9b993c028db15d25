//! Time handling for the reconciliation cycle
//!
//! Every decision that depends on "now" takes the instant as an explicit
//! parameter. The orchestrator obtains it from an injected [`Clock`] exactly
//! once per batch so that all claims in a run see the same instant.

use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Timestamp overflow adding {0} seconds")]
    Overflow(i64),
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by `Utc::now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a chosen instant
///
/// Used by tests and by replaying a batch "as of" a given time.
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Moves the pinned instant forward by `by`
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.instant.write() {
            *guard += by;
        }
    }

    /// Re-pins the clock
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.instant.write() {
            *guard = instant;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.instant.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Adds `window` to `start`, failing rather than panicking on overflow
pub fn checked_deadline(
    start: DateTime<Utc>,
    window: Duration,
) -> Result<DateTime<Utc>, TemporalError> {
    start
        .checked_add_signed(window)
        .ok_or(TemporalError::Overflow(window.num_seconds()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_advance() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        clock.advance(Duration::hours(72));
        assert_eq!(clock.now(), start + Duration::hours(72));
    }

    #[test]
    fn test_checked_deadline() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let due = checked_deadline(start, Duration::days(7)).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap());
        assert!(checked_deadline(DateTime::<Utc>::MAX_UTC, Duration::days(1)).is_err());
    }
}
