//! Ordered event store abstraction.
//!
//! The store is a min-ordered container keyed by absolute due time. It owns the
//! values inserted into it until they are removed or the store is torn down.

use std::fmt;

use crate::util::clock::Timestamp;

/// Opaque handle returned by [`EventStore::insert`].
///
/// A handle stays valid until its value is removed. Stores must reject stale
/// handles (for example by checking a generation counter) instead of touching
/// whatever value may have reused the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreHandle {
    slot: usize,
    generation: u32,
}

impl StoreHandle {
    /// Build a handle from a slot index and generation.
    pub const fn new(slot: usize, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Slot index inside the store.
    pub const fn slot(self) -> usize {
        self.slot
    }

    /// Generation of the slot at insertion time.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.slot, self.generation)
    }
}

/// Failed insertion. Ownership of the value goes back to the caller.
#[derive(Debug)]
pub struct InsertError<T> {
    /// The value that could not be stored.
    pub value: T,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Abstraction for ordered event store backends.
pub trait EventStore<T> {
    /// Insert `value` keyed by `due`.
    fn insert(&mut self, due: Timestamp, value: T) -> Result<StoreHandle, InsertError<T>>;
    /// Handle and due time of the earliest entry. Entries with equal due times
    /// come out in insertion order.
    fn peek_min(&mut self) -> Option<(StoreHandle, Timestamp)>;
    /// Remove the entry named by `handle`. Returns `None` for stale handles.
    fn remove(&mut self, handle: StoreHandle) -> Option<T>;
    /// Whether `handle` names a live entry.
    fn contains(&self, handle: StoreHandle) -> bool;
    /// Number of live entries.
    fn len(&self) -> usize;
    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Remove every entry and hand the values back; dropping the result frees them.
    fn destroy_all(&mut self) -> Vec<T>;
}
