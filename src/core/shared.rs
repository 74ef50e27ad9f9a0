//! Thread-shared scheduler handle.
//!
//! Producers on other threads (a command pipe reader, a signal thread) can
//! schedule and cancel items while the main loop runs. Every store access takes
//! the same `parking_lot::Mutex`, so a cancellation and a timed dispatch of the
//! same item can never overlap. The lock is released while the loop waits in
//! the poller.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::info;

use crate::core::scheduler::Plan;
use crate::core::{
    ExecutionMetadata, ItemHandle, LoopExit, LoopHooks, ReadinessPoller, Scheduler,
    SchedulerError, SignalFlags,
};
use crate::util::telemetry::TARGET_EVENTS;

/// Cloneable, lock-protected [`Scheduler`].
///
/// Callbacks run with the lock held and receive the inner `&mut Scheduler`;
/// they must use that reference instead of calling back into the shared
/// handle, which would deadlock.
pub struct SharedScheduler<D> {
    inner: Arc<Mutex<Scheduler<D>>>,
    signals: SignalFlags,
}

impl<D> Clone for SharedScheduler<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            signals: self.signals.clone(),
        }
    }
}

impl<D> std::fmt::Debug for SharedScheduler<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedScheduler").finish_non_exhaustive()
    }
}

impl<D: Send + 'static> SharedScheduler<D> {
    /// Wrap a scheduler for shared use.
    pub fn new(scheduler: Scheduler<D>) -> Self {
        let signals = scheduler.signals().clone();
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
            signals,
        }
    }

    /// Request flags, readable without taking the lock.
    pub const fn signals(&self) -> &SignalFlags {
        &self.signals
    }

    /// Run `f` with exclusive access to the scheduler.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler<D>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// See [`Scheduler::schedule`].
    pub fn schedule<F>(&self, delay: Duration, callback: F, user_data: D) -> ItemHandle
    where
        F: FnOnce(&mut Scheduler<D>, ExecutionMetadata<D>) + Send + 'static,
    {
        self.inner.lock().schedule(delay, callback, user_data)
    }

    /// See [`Scheduler::try_schedule`].
    pub fn try_schedule<F>(
        &self,
        delay: Duration,
        callback: F,
        user_data: D,
    ) -> Result<ItemHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<D>, ExecutionMetadata<D>) + Send + 'static,
    {
        self.inner.lock().try_schedule(delay, callback, user_data)
    }

    /// See [`Scheduler::cancel`]. The callback runs on the calling thread.
    pub fn cancel(&self, handle: ItemHandle) -> Result<(), SchedulerError> {
        self.inner.lock().cancel(handle)
    }

    /// Number of items in the store.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// See [`Scheduler::shutdown`].
    pub fn shutdown(&self) -> usize {
        self.inner.lock().shutdown()
    }

    /// [`Scheduler::run_loop`] that holds the lock for every step except the poll.
    pub fn run_loop<P, H>(&self, mut poller: P, mut hooks: H) -> LoopExit
    where
        P: ReadinessPoller,
        H: LoopHooks,
    {
        info!(target: TARGET_EVENTS, events = self.len(), "entering shared event loop");
        let exit = loop {
            let wait = {
                let mut sched = self.inner.lock();
                match sched.plan_iteration(&mut hooks) {
                    Plan::Exit(exit) => break exit,
                    Plan::Wait(wait) => {
                        sched.trace_poll(wait, poller.source_count());
                        wait
                    }
                }
            };
            let polled = poller.poll(wait.timeout_ms);
            if let Some(exit) = self.inner.lock().complete_iteration(wait, polled) {
                break exit;
            }
        };
        info!(target: TARGET_EVENTS, ?exit, "leaving shared event loop");
        exit
    }
}
