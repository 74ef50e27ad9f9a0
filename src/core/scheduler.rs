//! The timed event scheduler and its poll-driven main loop.
//!
//! A [`Scheduler`] owns one ordered event store. Items enter it through
//! [`Scheduler::schedule`] and leave it only through dispatch: either the main
//! loop fires the earliest item once it is due, or [`Scheduler::cancel`] forces
//! it out early with [`ExecReason::Abort`]. Dispatch removes the item, runs its
//! callback, and releases it, so every item runs at most once.
//!
//! The main loop interleaves timers with worker I/O. Each iteration polls the
//! readiness sources for at most the time left before the next due item, capped
//! at [`MAX_POLL_WAIT_MS`] so external requests are noticed promptly. Any I/O
//! activity restarts the iteration; a timer is never fired early.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace};

use crate::config::SchedulerConfig;
use crate::core::item::ItemRef;
use crate::core::{
    BoxedCallback, EventStore, ExecReason, ExecutionMetadata, InsertError, ItemHandle, LoopHooks,
    ReadinessPoller, ScheduledItem, SchedulerError, SignalFlags, StoreHandle,
};
use crate::infra::store::HeapEventStore;
use crate::util::clock::{delta_ms, Clock, SystemClock, Timestamp};
use crate::util::telemetry::{TARGET_EVENTS, TARGET_IPC, TARGET_SCHEDULING};

/// Smallest initial capacity of the event store.
pub const MIN_QUEUE_CAPACITY: usize = 4096;

/// Upper bound for a single poll wait, in milliseconds.
pub const MAX_POLL_WAIT_MS: u64 = 1500;

/// Store type held by a scheduler.
pub type BoxedStore<D> = Box<dyn EventStore<ScheduledItem<D>> + Send>;

/// Why [`Scheduler::run_loop`] returned.
#[derive(Debug)]
pub enum LoopExit {
    /// A shutdown request was observed.
    Shutdown,
    /// A restart request was observed.
    Restart,
    /// No items remain in the store.
    QueueEmpty,
    /// The poller failed for a reason other than interruption.
    PollFailed(io::Error),
}

impl LoopExit {
    /// Whether the loop stopped because of a poller failure.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::PollFailed(_))
    }

    /// Convert a poller failure into an error, passing other exits through.
    pub fn into_result(self) -> Result<Self, SchedulerError> {
        match self {
            Self::PollFailed(err) => Err(SchedulerError::Poll(err.to_string())),
            other => Ok(other),
        }
    }
}

/// The item an iteration is waiting on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingWait {
    pub handle: StoreHandle,
    pub timeout_ms: u64,
}

/// Result of the first half of an iteration.
#[derive(Debug)]
pub(crate) enum Plan {
    Exit(LoopExit),
    Wait(PendingWait),
}

/// Poll timeout for an item due at `due`, clamped to `[0, ceiling_ms]`.
///
/// Overdue items yield `0`, a non-blocking poll.
pub fn poll_timeout_ms(now: Timestamp, due: Timestamp, ceiling_ms: u64) -> u64 {
    u64::try_from(delta_ms(now, due)).map_or(0, |ms| ms.min(ceiling_ms))
}

/// Timed event scheduler.
///
/// `D` is the caller's user data type, handed back to the callback on dispatch.
pub struct Scheduler<D> {
    store: BoxedStore<D>,
    /// Items the store refused; they never fire by timer.
    detached: HashMap<u64, ScheduledItem<D>>,
    next_detached_id: u64,
    clock: Arc<dyn Clock>,
    signals: SignalFlags,
    max_poll_wait_ms: u64,
}

impl<D> fmt::Debug for Scheduler<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.store.len())
            .field("detached", &self.detached.len())
            .field("max_poll_wait_ms", &self.max_poll_wait_ms)
            .finish_non_exhaustive()
    }
}

impl<D: Send + 'static> Scheduler<D> {
    /// Create a scheduler whose store is sized to `max(capacity_hint, 4096)`.
    ///
    /// The hint is usually the number of monitored hosts plus services; the
    /// store grows past it when needed.
    pub fn new(capacity_hint: usize) -> Self {
        let capacity = capacity_hint.max(MIN_QUEUE_CAPACITY);
        debug!(target: TARGET_EVENTS, capacity, "creating event queue");
        Self::with_store(HeapEventStore::with_capacity(capacity))
    }

    /// Create a scheduler from validated configuration.
    pub fn with_config(cfg: &SchedulerConfig, capacity_hint: usize) -> Result<Self, SchedulerError> {
        cfg.validate().map_err(SchedulerError::InvalidConfig)?;
        let capacity = capacity_hint.max(cfg.min_queue_capacity);
        let store = match cfg.max_pending_events {
            Some(limit) => HeapEventStore::bounded(capacity.min(limit), limit),
            None => HeapEventStore::with_capacity(capacity),
        };
        debug!(target: TARGET_EVENTS, capacity, limit = ?cfg.max_pending_events, "creating event queue");
        Ok(Self::with_store(store).with_max_poll_wait(cfg.max_poll_wait_ms))
    }

    /// Create a scheduler over a caller-supplied store.
    pub fn with_store<S>(store: S) -> Self
    where
        S: EventStore<ScheduledItem<D>> + Send + 'static,
    {
        Self {
            store: Box::new(store),
            detached: HashMap::new(),
            next_detached_id: 0,
            clock: Arc::new(SystemClock),
            signals: SignalFlags::new(),
            max_poll_wait_ms: MAX_POLL_WAIT_MS,
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Share an existing set of request flags with the signal layer.
    #[must_use]
    pub fn with_signals(mut self, signals: SignalFlags) -> Self {
        self.signals = signals;
        self
    }

    /// Override the poll wait ceiling.
    #[must_use]
    pub fn with_max_poll_wait(mut self, max_poll_wait_ms: u64) -> Self {
        self.max_poll_wait_ms = max_poll_wait_ms;
        self
    }

    /// Request flags observed by the main loop.
    pub const fn signals(&self) -> &SignalFlags {
        &self.signals
    }

    /// Current time according to the scheduler's clock.
    pub fn now_ms(&self) -> Timestamp {
        self.clock.now_ms()
    }

    /// Number of items in the store.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of items the store refused that are still awaiting cancel or shutdown.
    pub fn degenerate_count(&self) -> usize {
        self.detached.len()
    }

    /// Due time of the earliest pending item.
    pub fn next_due(&mut self) -> Option<Timestamp> {
        self.store.peek_min().map(|(_, due)| due)
    }

    /// Whether `handle` still names a pending item.
    pub fn contains(&self, handle: ItemHandle) -> bool {
        match handle.0 {
            ItemRef::Stored(h) => self.store.contains(h),
            ItemRef::Detached(id) => self.detached.contains_key(&id),
        }
    }

    /// Schedule `callback` to run `delay` from now with `user_data`.
    ///
    /// The due time has whole-second resolution; sub-second parts of `delay`
    /// are dropped. If the store refuses the item, the failure is logged and a
    /// degenerate handle is returned: the item will never fire by timer, but
    /// [`cancel`](Self::cancel) and [`shutdown`](Self::shutdown) still reach it.
    pub fn schedule<F>(&mut self, delay: Duration, callback: F, user_data: D) -> ItemHandle
    where
        F: FnOnce(&mut Self, ExecutionMetadata<D>) + Send + 'static,
    {
        self.schedule_boxed(delay, Box::new(callback), user_data)
    }

    /// [`schedule`](Self::schedule) for an already boxed callback.
    pub fn schedule_boxed(
        &mut self,
        delay: Duration,
        callback: BoxedCallback<D>,
        user_data: D,
    ) -> ItemHandle {
        match self.insert(delay, callback, user_data) {
            Ok(handle) => handle,
            Err(InsertError { value, reason }) => {
                error!(
                    target: TARGET_EVENTS,
                    events = self.store.len(),
                    %reason,
                    "failed to add event to queue"
                );
                let id = self.next_detached_id;
                self.next_detached_id = self.next_detached_id.wrapping_add(1);
                self.detached.insert(id, value);
                ItemHandle(ItemRef::Detached(id))
            }
        }
    }

    /// Like [`schedule`](Self::schedule), but a refused insertion is returned
    /// as [`SchedulerError::Insert`] and the item is dropped without running.
    pub fn try_schedule<F>(
        &mut self,
        delay: Duration,
        callback: F,
        user_data: D,
    ) -> Result<ItemHandle, SchedulerError>
    where
        F: FnOnce(&mut Self, ExecutionMetadata<D>) + Send + 'static,
    {
        self.insert(delay, Box::new(callback), user_data)
            .map_err(|err| SchedulerError::Insert(err.reason))
    }

    fn insert(
        &mut self,
        delay: Duration,
        callback: BoxedCallback<D>,
        user_data: D,
    ) -> Result<ItemHandle, InsertError<ScheduledItem<D>>> {
        let now_secs = self.clock.now_ms() / 1000;
        let due_time = (now_secs + Timestamp::from(delay.as_secs())) * 1000;
        let item = ScheduledItem {
            due_time,
            callback,
            user_data,
        };
        let handle = ItemHandle(ItemRef::Stored(self.store.insert(due_time, item)?));
        trace!(target: TARGET_EVENTS, %handle, due_time, "scheduled event");
        Ok(handle)
    }

    /// Dispatch `handle` immediately with [`ExecReason::Abort`], whatever its
    /// due time.
    ///
    /// The callback runs synchronously on the caller's thread. A handle that
    /// was already dispatched or released yields [`SchedulerError::UnknownItem`]
    /// and runs nothing.
    pub fn cancel(&mut self, handle: ItemHandle) -> Result<(), SchedulerError> {
        debug!(target: TARGET_EVENTS, %handle, "cancelling event");
        if self.dispatch(handle, ExecReason::Abort) {
            Ok(())
        } else {
            Err(SchedulerError::UnknownItem(handle))
        }
    }

    /// Remove, run, and release one item. Absent items are a no-op.
    ///
    /// The item is moved out of the store before the callback runs, and its
    /// remains are dropped when the callback returns or unwinds.
    fn dispatch(&mut self, handle: ItemHandle, reason: ExecReason) -> bool {
        let item = match handle.0 {
            ItemRef::Stored(h) => self.store.remove(h),
            ItemRef::Detached(id) => self.detached.remove(&id),
        };
        let Some(ScheduledItem {
            due_time,
            callback,
            user_data,
        }) = item
        else {
            return false;
        };
        let meta = ExecutionMetadata {
            handle,
            due_time,
            reason,
            latency: Duration::ZERO,
            user_data,
        };
        callback.call(self, meta);
        true
    }

    /// Release every pending item without running any callback.
    ///
    /// Returns how many items were released. Must not be called from inside a
    /// running main loop; calling it again releases nothing.
    pub fn shutdown(&mut self) -> usize {
        let released = self.store.destroy_all().len() + self.detached.len();
        self.detached.clear();
        debug!(target: TARGET_EVENTS, released, "destroyed event queue");
        released
    }

    /// Run the main loop until no items remain, a shutdown or restart request
    /// is observed, or the poller fails.
    ///
    /// `poller` and `hooks` may be passed by value or as `&mut`.
    pub fn run_loop<P, H>(&mut self, mut poller: P, mut hooks: H) -> LoopExit
    where
        P: ReadinessPoller,
        H: LoopHooks,
    {
        info!(target: TARGET_EVENTS, events = self.store.len(), "entering event loop");
        let exit = loop {
            let wait = match self.plan_iteration(&mut hooks) {
                Plan::Exit(exit) => break exit,
                Plan::Wait(wait) => wait,
            };
            self.trace_poll(wait, poller.source_count());
            let polled = poller.poll(wait.timeout_ms);
            if let Some(exit) = self.complete_iteration(wait, polled) {
                break exit;
            }
        };
        info!(target: TARGET_EVENTS, ?exit, "leaving event loop");
        exit
    }

    /// Termination checks, log rotation, and timeout computation.
    pub(crate) fn plan_iteration<H: LoopHooks>(&mut self, hooks: &mut H) -> Plan {
        if self.signals.shutdown_requested() {
            return Plan::Exit(LoopExit::Shutdown);
        }
        if self.signals.restart_requested() {
            return Plan::Exit(LoopExit::Restart);
        }

        let now = self.clock.now_ms();
        if self.signals.take_log_rotation() {
            hooks.rotate_log(now);
            hooks.update_program_status();
        }

        let Some((handle, due)) = self.store.peek_min() else {
            debug!(target: TARGET_EVENTS, "no events left to handle, exiting");
            return Plan::Exit(LoopExit::QueueEmpty);
        };

        Plan::Wait(PendingWait {
            handle,
            timeout_ms: poll_timeout_ms(now, due, self.max_poll_wait_ms),
        })
    }

    pub(crate) fn trace_poll(&self, wait: PendingWait, sources: usize) {
        debug!(
            target: TARGET_SCHEDULING,
            poll_ms = wait.timeout_ms,
            sources,
            events = self.store.len(),
            "polling"
        );
    }

    /// Act on a poll result. Returns `Some` when the loop must stop.
    pub(crate) fn complete_iteration(
        &mut self,
        wait: PendingWait,
        polled: io::Result<usize>,
    ) -> Option<LoopExit> {
        let inputs = match polled {
            Ok(inputs) => inputs,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                trace!(target: TARGET_IPC, "poll interrupted");
                return None;
            }
            Err(err) => {
                error!(target: TARGET_IPC, error = %err, "polling for input failed");
                return Some(LoopExit::PollFailed(err));
            }
        };

        debug!(target: TARGET_IPC, inputs, "descriptors had input");
        if inputs > 0 {
            debug!(target: TARGET_EVENTS, "timed event deferred by poller input");
            return None;
        }

        // The wait may have been capped below the real remaining time, and the
        // queue head may have changed while the poll was in progress.
        let due = match self.store.peek_min() {
            Some((handle, due)) if handle == wait.handle => due,
            _ => return None,
        };
        if delta_ms(self.clock.now_ms(), due) > 0 {
            return None;
        }

        self.dispatch(ItemHandle(ItemRef::Stored(wait.handle)), ExecReason::Timed);
        None
    }
}
