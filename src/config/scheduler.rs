//! Scheduler configuration structures.

use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, MAX_POLL_WAIT_MS, MIN_QUEUE_CAPACITY};

/// Prefix of the environment variables read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "TIMED_EVENTS_";

/// Root scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Floor for the initial event store capacity.
    pub min_queue_capacity: usize,
    /// Ceiling for a single poll wait in milliseconds.
    pub max_poll_wait_ms: u64,
    /// Hard limit on pending items. `None` lets the store grow freely.
    pub max_pending_events: Option<usize>,
    /// Number of monitored hosts, used to size the store.
    pub monitored_hosts: usize,
    /// Number of monitored services, used to size the store.
    pub monitored_services: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_queue_capacity: MIN_QUEUE_CAPACITY,
            max_poll_wait_ms: MAX_POLL_WAIT_MS,
            max_pending_events: None,
            monitored_hosts: 0,
            monitored_services: 0,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_queue_capacity == 0 {
            return Err("min_queue_capacity must be greater than 0".into());
        }
        if self.max_poll_wait_ms == 0 {
            return Err("max_poll_wait_ms must be greater than 0".into());
        }
        if self.max_pending_events == Some(0) {
            return Err("max_pending_events must be greater than 0 when set".into());
        }
        Ok(())
    }

    /// Capacity hint derived from the monitored object counts.
    pub const fn capacity_hint(&self) -> usize {
        self.monitored_hosts.saturating_add(self.monitored_services)
    }

    /// Parse scheduler configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment, after reading a
    /// `.env` file if one exists. Unset variables keep their defaults.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup such as `std::env::var`.
    ///
    /// Recognised keys: `TIMED_EVENTS_MIN_QUEUE_CAPACITY`,
    /// `TIMED_EVENTS_MAX_POLL_WAIT_MS`, `TIMED_EVENTS_MAX_PENDING_EVENTS`,
    /// `TIMED_EVENTS_MONITORED_HOSTS`, `TIMED_EVENTS_MONITORED_SERVICES`.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = parse_var(&lookup, "MIN_QUEUE_CAPACITY")? {
            cfg.min_queue_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_POLL_WAIT_MS")? {
            cfg.max_poll_wait_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_PENDING_EVENTS")? {
            cfg.max_pending_events = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "MONITORED_HOSTS")? {
            cfg.monitored_hosts = v;
        }
        if let Some(v) = parse_var(&lookup, "MONITORED_SERVICES")? {
            cfg.monitored_services = v;
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let key = format!("{ENV_PREFIX}{name}");
    lookup(&key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}
