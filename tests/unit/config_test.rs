//! Tests for configuration validation

use std::collections::HashMap;

use timed_events::config::SchedulerConfig;
use timed_events::core::{MAX_POLL_WAIT_MS, MIN_QUEUE_CAPACITY};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_scheduler_config_defaults() {
    let cfg = SchedulerConfig::default();
    assert_eq!(cfg.min_queue_capacity, MIN_QUEUE_CAPACITY);
    assert_eq!(cfg.max_poll_wait_ms, MAX_POLL_WAIT_MS);
    assert_eq!(cfg.max_pending_events, None);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_scheduler_config_invalid_capacity() {
    let invalid = SchedulerConfig {
        min_queue_capacity: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_poll_wait() {
    let invalid = SchedulerConfig {
        max_poll_wait_ms: 0,
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_scheduler_config_invalid_limit() {
    let invalid = SchedulerConfig {
        max_pending_events: Some(0),
        ..SchedulerConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_capacity_hint_sums_objects() {
    let cfg = SchedulerConfig {
        monitored_hosts: 120,
        monitored_services: 900,
        ..SchedulerConfig::default()
    };
    assert_eq!(cfg.capacity_hint(), 1020);
}

#[test]
fn test_from_json_partial_document() {
    let cfg = SchedulerConfig::from_json_str(r#"{"max_poll_wait_ms": 500, "monitored_hosts": 3}"#)
        .unwrap();
    assert_eq!(cfg.max_poll_wait_ms, 500);
    assert_eq!(cfg.monitored_hosts, 3);
    assert_eq!(cfg.min_queue_capacity, MIN_QUEUE_CAPACITY);
}

#[test]
fn test_from_json_rejects_invalid_values() {
    assert!(SchedulerConfig::from_json_str(r#"{"max_poll_wait_ms": 0}"#).is_err());
    assert!(SchedulerConfig::from_json_str("not json").is_err());
}

#[test]
fn test_json_serialization() {
    let cfg = SchedulerConfig {
        max_pending_events: Some(10_000),
        ..SchedulerConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(SchedulerConfig::from_json_str(&json).unwrap(), cfg);
}

#[test]
fn test_from_lookup_reads_prefixed_vars() {
    let cfg = SchedulerConfig::from_lookup(lookup(&[
        ("TIMED_EVENTS_MAX_POLL_WAIT_MS", "750"),
        ("TIMED_EVENTS_MAX_PENDING_EVENTS", " 64 "),
        ("TIMED_EVENTS_MONITORED_SERVICES", "12"),
        ("MAX_POLL_WAIT_MS", "1"),
    ]))
    .unwrap();
    assert_eq!(cfg.max_poll_wait_ms, 750);
    assert_eq!(cfg.max_pending_events, Some(64));
    assert_eq!(cfg.monitored_services, 12);
    assert_eq!(cfg.min_queue_capacity, MIN_QUEUE_CAPACITY);
}

#[test]
fn test_from_lookup_empty_is_default() {
    let cfg = SchedulerConfig::from_lookup(|_| None).unwrap();
    assert_eq!(cfg, SchedulerConfig::default());
}

#[test]
fn test_from_lookup_rejects_garbage() {
    let err = SchedulerConfig::from_lookup(lookup(&[("TIMED_EVENTS_MONITORED_HOSTS", "many")]))
        .unwrap_err();
    assert!(err.to_string().contains("TIMED_EVENTS_MONITORED_HOSTS"));
}

#[test]
fn test_from_lookup_validates() {
    let result = SchedulerConfig::from_lookup(lookup(&[("TIMED_EVENTS_MIN_QUEUE_CAPACITY", "0")]));
    assert!(result.is_err());
}
