//! Scheduled items, their handles, and the callback abstraction.

use std::fmt;
use std::time::Duration;

use crate::core::{Scheduler, StoreHandle};
use crate::util::clock::Timestamp;

/// Why a callback is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecReason {
    /// The item reached its due time and was fired by the main loop.
    Timed,
    /// The item was cancelled before firing.
    Abort,
}

/// Metadata handed to a callback on dispatch.
///
/// The user data is moved out of the released item into the metadata; the item
/// itself no longer exists by the time the callback observes this value.
#[derive(Debug)]
pub struct ExecutionMetadata<D> {
    /// Handle of the dispatched item. Stale once the callback is running.
    pub handle: ItemHandle,
    /// Due time recorded when the item was scheduled.
    pub due_time: Timestamp,
    /// Timed firing or forced abort.
    pub reason: ExecReason,
    /// Reserved for the overrun between due time and fire time. Always zero.
    pub latency: Duration,
    /// Caller-owned data passed through untouched.
    pub user_data: D,
}

impl<D> ExecutionMetadata<D> {
    /// Whether this dispatch is a cancellation rather than a timed firing.
    pub fn is_abort(&self) -> bool {
        self.reason == ExecReason::Abort
    }
}

/// Unit of work run when an item is dispatched.
///
/// The callback receives the scheduler so it can re-arm itself or cancel other
/// items. Closures of the matching shape implement this trait automatically.
///
/// ```rust
/// use timed_events::core::Scheduler;
/// use std::time::Duration;
///
/// let mut scheduler: Scheduler<&'static str> = Scheduler::new(0);
/// scheduler.schedule(
///     Duration::from_secs(60),
///     |sched, meta| {
///         if !meta.is_abort() {
///             sched.schedule(Duration::from_secs(60), |_, _| {}, meta.user_data);
///         }
///     },
///     "host-check",
/// );
/// assert_eq!(scheduler.len(), 1);
/// ```
pub trait EventCallback<D>: Send {
    /// Consume the callback and run it.
    fn call(self: Box<Self>, scheduler: &mut Scheduler<D>, meta: ExecutionMetadata<D>);
}

impl<D, F> EventCallback<D> for F
where
    F: FnOnce(&mut Scheduler<D>, ExecutionMetadata<D>) + Send,
{
    fn call(self: Box<Self>, scheduler: &mut Scheduler<D>, meta: ExecutionMetadata<D>) {
        (*self)(scheduler, meta);
    }
}

/// Boxed callback as stored inside a [`ScheduledItem`].
pub type BoxedCallback<D> = Box<dyn EventCallback<D>>;

/// One pending unit of work, exclusively owned by the scheduler.
pub struct ScheduledItem<D> {
    /// Absolute time at which the item becomes eligible to fire.
    pub due_time: Timestamp,
    /// Work to run on dispatch.
    pub callback: BoxedCallback<D>,
    /// Caller data, never inspected.
    pub user_data: D,
}

impl<D> fmt::Debug for ScheduledItem<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledItem")
            .field("due_time", &self.due_time)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ItemRef {
    Stored(StoreHandle),
    Detached(u64),
}

/// Caller-facing reference to a scheduled item, usable with
/// [`Scheduler::cancel`].
///
/// A handle carries the item's store handle, or none when the store refused the
/// item (a degenerate item that can only be cancelled or shut down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(pub(crate) ItemRef);

impl ItemHandle {
    /// Handle into the event store, absent for degenerate items.
    pub const fn store_handle(self) -> Option<StoreHandle> {
        match self.0 {
            ItemRef::Stored(handle) => Some(handle),
            ItemRef::Detached(_) => None,
        }
    }

    /// Whether the store refused this item, so it will never fire by timer.
    pub const fn is_degenerate(self) -> bool {
        matches!(self.0, ItemRef::Detached(_))
    }
}

impl fmt::Display for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ItemRef::Stored(handle) => write!(f, "event {handle}"),
            ItemRef::Detached(id) => write!(f, "detached event {id}"),
        }
    }
}
