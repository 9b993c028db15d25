//! Tests for clocks and deadline arithmetic

use chrono::{Duration, TimeZone, Utc};
use core_kernel::{checked_deadline, Clock, FixedClock, SystemClock, TemporalError};
use std::sync::Arc;

#[test]
fn test_fixed_clock_is_stable_until_moved() {
    let instant = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    let clock = FixedClock::new(instant);
    assert_eq!(clock.now(), instant);
    assert_eq!(clock.now(), instant);

    let later = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
    clock.set(later);
    assert_eq!(clock.now(), later);
}

#[test]
fn test_clock_is_object_safe() {
    let clocks: Vec<Arc<dyn Clock>> = vec![
        Arc::new(SystemClock),
        Arc::new(FixedClock::new(Utc::now())),
    ];
    for clock in clocks {
        assert!(clock.now() <= Utc::now() + Duration::seconds(1));
    }
}

#[test]
fn test_deadline_windows() {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    assert_eq!(
        checked_deadline(created, Duration::hours(72)).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 4, 12, 0, 0).unwrap()
    );
    assert_eq!(
        checked_deadline(created, Duration::hours(7 * 24)).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 8, 12, 0, 0).unwrap()
    );
}

#[test]
fn test_deadline_overflow_is_an_error() {
    let result = checked_deadline(chrono::DateTime::<Utc>::MAX_UTC, Duration::hours(1));
    assert_eq!(result, Err(TemporalError::Overflow(3600)));
}
