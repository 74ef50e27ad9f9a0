//! Core scheduling abstractions: items, store and poller seams, and the main loop.

pub mod error;
pub mod hooks;
pub mod item;
pub mod poller;
pub mod scheduler;
pub mod shared;
pub mod signals;
pub mod store;

pub use error::{AppResult, SchedulerError};
pub use hooks::{LoopHooks, NoopHooks};
pub use item::{BoxedCallback, EventCallback, ExecReason, ExecutionMetadata, ItemHandle, ScheduledItem};
pub use poller::ReadinessPoller;
pub use scheduler::{
    poll_timeout_ms, BoxedStore, LoopExit, Scheduler, MAX_POLL_WAIT_MS, MIN_QUEUE_CAPACITY,
};
pub use shared::SharedScheduler;
pub use signals::SignalFlags;
pub use store::{EventStore, InsertError, StoreHandle};
