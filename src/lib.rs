//! # Timed Events
//!
//! The event scheduler at the centre of a monitoring daemon.
//!
//! Host and service checks, notifications and housekeeping jobs are all
//! deferred work items with a due time. This crate keeps them in one ordered
//! queue and drives a single-threaded main loop that merges timer expiry with
//! readiness polling of worker I/O.
//!
//! ## Guarantees
//!
//! - **At-most-once dispatch**: an item leaves the queue exactly once, either
//!   fired by the loop or cancelled, and its callback runs once at that moment
//! - **Earliest-due-first**: the loop always targets the queue minimum
//! - **Never early**: a capped poll wait never fires an item before its time
//! - **Bounded wait**: a single poll blocks for at most 1500ms, so shutdown,
//!   restart and log-rotation requests are noticed promptly
//! - **I/O first**: any poller readiness defers timer evaluation to the next pass
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use timed_events::core::{ExecReason, LoopExit, NoopHooks, Scheduler};
//! use timed_events::infra::poller::IdlePoller;
//!
//! let mut scheduler: Scheduler<&'static str> = Scheduler::new(0);
//! scheduler.schedule(
//!     Duration::ZERO,
//!     |_sched, meta| assert_eq!(meta.reason, ExecReason::Timed),
//!     "check_ping on web-01",
//! );
//!
//! let exit = scheduler.run_loop(IdlePoller, NoopHooks);
//! assert!(matches!(exit, LoopExit::QueueEmpty));
//! ```
//!
//! For thread-shared use see [`core::SharedScheduler`]; for sizing from the
//! monitored object counts see [`builders::build_scheduler`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions and the main loop.
pub mod core;
/// Configuration models for the scheduler.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for event stores and readiness pollers.
pub mod infra;
/// Shared utilities.
pub mod util;
