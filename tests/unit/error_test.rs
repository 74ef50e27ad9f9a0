//! Tests for error types

use std::time::Duration;

use timed_events::core::{Scheduler, SchedulerError};

#[test]
fn test_insert_error() {
    let err = SchedulerError::Insert("store at capacity (2 items)".to_string());
    assert_eq!(format!("{}", err), "insert failed: store at capacity (2 items)");
}

#[test]
fn test_poll_error() {
    let err = SchedulerError::Poll("bad file descriptor".to_string());
    assert_eq!(format!("{}", err), "poll failed: bad file descriptor");
}

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("max_poll_wait_ms must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid config: max_poll_wait_ms must be greater than 0"
    );
}

#[test]
fn test_unknown_item_error_names_handle() {
    let mut sched: Scheduler<()> = Scheduler::new(0);
    let handle = sched.schedule(Duration::from_secs(1), |_, _| {}, ());
    sched.cancel(handle).unwrap();

    let err = sched.cancel(handle).unwrap_err();
    assert_eq!(format!("{}", err), format!("unknown item: {handle}"));
}

#[test]
fn test_errors_convert_to_anyhow() {
    let err: anyhow::Error = SchedulerError::Poll("eintr storm".to_string()).into();
    assert!(err.downcast_ref::<SchedulerError>().is_some());
}
