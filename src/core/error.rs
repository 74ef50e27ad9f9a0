//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::ItemHandle;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The event store refused a new item.
    #[error("insert failed: {0}")]
    Insert(String),
    /// The handle does not name a pending item (already dispatched or released).
    #[error("unknown item: {0}")]
    UnknownItem(ItemHandle),
    /// The readiness poller failed for a reason other than interruption.
    #[error("poll failed: {0}")]
    Poll(String),
    /// Configuration value out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
