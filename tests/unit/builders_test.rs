//! Tests for builder modules

use std::cell::Cell;
use std::time::Duration;

use timed_events::builders::{build_scheduler, build_scheduler_with};
use timed_events::config::SchedulerConfig;
use timed_events::core::{Scheduler, SchedulerError, MIN_QUEUE_CAPACITY};
use timed_events::infra::store::HeapEventStore;

#[test]
fn test_build_scheduler_defaults() {
    let sched: Scheduler<u32> = build_scheduler(&SchedulerConfig::default()).unwrap();
    assert!(sched.is_empty());
    assert_eq!(sched.degenerate_count(), 0);
}

#[test]
fn test_build_scheduler_rejects_invalid_config() {
    let cfg = SchedulerConfig {
        max_poll_wait_ms: 0,
        ..SchedulerConfig::default()
    };
    let result = build_scheduler::<u32>(&cfg);
    assert!(matches!(result, Err(SchedulerError::InvalidConfig(_))));
}

#[test]
fn test_factory_receives_floored_capacity() {
    let seen = Cell::new(0);
    let cfg = SchedulerConfig {
        monitored_hosts: 10,
        monitored_services: 20,
        ..SchedulerConfig::default()
    };
    let sched: Scheduler<u32> = build_scheduler_with(&cfg, |capacity| {
        seen.set(capacity);
        Ok(HeapEventStore::with_capacity(capacity))
    })
    .unwrap();
    assert_eq!(seen.get(), MIN_QUEUE_CAPACITY);
    assert!(sched.is_empty());
}

#[test]
fn test_factory_uses_large_hint() {
    let seen = Cell::new(0);
    let cfg = SchedulerConfig {
        monitored_hosts: 5_000,
        monitored_services: 45_000,
        ..SchedulerConfig::default()
    };
    let _sched: Scheduler<u32> = build_scheduler_with(&cfg, |capacity| {
        seen.set(capacity);
        Ok(HeapEventStore::with_capacity(capacity))
    })
    .unwrap();
    assert_eq!(seen.get(), 50_000);
}

#[test]
fn test_factory_error_propagates() {
    let result: Result<Scheduler<u32>, _> =
        build_scheduler_with(&SchedulerConfig::default(), |_| {
            Err::<HeapEventStore<_>, _>(SchedulerError::Insert("no memory".into()))
        });
    assert!(matches!(result, Err(SchedulerError::Insert(_))));
}

#[test]
fn test_custom_store_limit_is_honoured() {
    let mut sched: Scheduler<u32> = build_scheduler_with(&SchedulerConfig::default(), |capacity| {
        Ok(HeapEventStore::bounded(capacity, 1))
    })
    .unwrap();
    assert!(sched.try_schedule(Duration::from_secs(1), |_, _| {}, 1).is_ok());
    assert!(sched.try_schedule(Duration::from_secs(1), |_, _| {}, 2).is_err());
}
