//! Tests for utility modules

use timed_events::core::SignalFlags;
use timed_events::util::{delta_ms, init_tracing, now_ms, Clock, ManualClock, SystemClock};

#[test]
fn test_delta_ms_saturates() {
    assert_eq!(delta_ms(0, u128::MAX), i64::MAX);
    assert_eq!(delta_ms(u128::MAX, 0), i64::MIN);
}

#[test]
fn test_now_ms_matches_system_clock() {
    let before = now_ms();
    let reading = SystemClock.now_ms();
    assert!(reading >= before);
}

#[test]
fn test_manual_clock_set_and_advance() {
    let clock = ManualClock::new(0);
    clock.advance(1_500);
    assert_eq!(clock.now_ms(), 1_500);
    clock.set(42);
    assert_eq!(clock.now_ms(), 42);
}

#[test]
fn test_signal_flags_shared_between_clones() {
    let flags = SignalFlags::new();
    let handler = flags.clone();
    assert!(!flags.shutdown_requested());

    handler.request_shutdown();
    handler.request_log_rotation();
    assert!(flags.shutdown_requested());
    assert!(flags.log_rotation_requested());

    assert!(flags.take_log_rotation());
    assert!(!flags.take_log_rotation());

    flags.reset();
    assert!(!handler.shutdown_requested());
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::debug!(target: timed_events::util::TARGET_EVENTS, "subscriber installed");
}
