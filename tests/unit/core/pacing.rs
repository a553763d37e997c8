//! Unit tests for request pacing

use chartdeck::core::pacing::{DelayPolicy, FixedDelay, NoDelay, DEFAULT_REQUEST_DELAY};
use std::time::Duration;

#[test]
fn fixed_delay_defaults_to_one_second() {
    assert_eq!(DEFAULT_REQUEST_DELAY, Duration::from_secs(1));
    let policy = FixedDelay::default();
    for index in [1, 2, 50] {
        assert_eq!(policy.delay_after(index), Duration::from_secs(1));
    }
}

#[test]
fn fixed_delay_uses_configured_duration() {
    let policy = FixedDelay(Duration::from_millis(250));
    assert_eq!(policy.delay_after(3), Duration::from_millis(250));
}

#[test]
fn no_delay_is_zero() {
    assert!(NoDelay.delay_after(1).is_zero());
}
