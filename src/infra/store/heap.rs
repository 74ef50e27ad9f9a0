//! Heap-backed event store with generation-checked slots.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::core::{EventStore, InsertError, StoreHandle};
use crate::util::clock::Timestamp;

/// Heap entry ordering items by due time, then by insertion sequence.
#[derive(Debug, Clone, Copy)]
struct HeapKey {
    due: Timestamp,
    seq: u64,
    handle: StoreHandle,
}

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for HeapKey {}

impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // Earlier due first; FIFO among equal due times.
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// In-memory event store.
///
/// Values live in a slot arena; a min-heap of keys orders them. Removing a
/// value bumps its slot's generation, which turns outstanding handles and the
/// matching heap key stale. Stale keys are skipped lazily by
/// [`peek_min`](EventStore::peek_min) and compacted away when they pile up.
#[derive(Debug)]
pub struct HeapEventStore<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    heap: BinaryHeap<Reverse<HeapKey>>,
    len: usize,
    next_seq: u64,
    max_len: Option<usize>,
}

impl<T> HeapEventStore<T> {
    /// Create a store preallocated for `capacity` entries. It grows on demand.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            heap: BinaryHeap::with_capacity(capacity),
            len: 0,
            next_seq: 0,
            max_len: None,
        }
    }

    /// Create a store that refuses inserts once it holds `max_len` entries.
    pub fn bounded(capacity: usize, max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::with_capacity(capacity)
        }
    }

    fn is_live(&self, handle: StoreHandle) -> bool {
        self.slots
            .get(handle.slot())
            .is_some_and(|slot| slot.generation == handle.generation() && slot.value.is_some())
    }

    fn allocate_slot(&mut self) -> Result<usize, String> {
        if let Some(index) = self.free.pop() {
            return Ok(index);
        }
        self.slots
            .try_reserve(1)
            .map_err(|e| format!("slot allocation failed: {e}"))?;
        self.slots.push(Slot {
            generation: 0,
            value: None,
        });
        Ok(self.slots.len() - 1)
    }

    /// Rebuild the heap once stale keys outnumber live ones.
    fn maybe_compact(&mut self) {
        if self.heap.len() <= 64 || self.heap.len() <= self.len.saturating_mul(2) {
            return;
        }
        let keys: Vec<_> = self.heap.drain().collect();
        self.heap = keys
            .into_iter()
            .filter(|Reverse(key)| self.is_live(key.handle))
            .collect();
    }
}

impl<T> EventStore<T> for HeapEventStore<T> {
    fn insert(&mut self, due: Timestamp, value: T) -> Result<StoreHandle, InsertError<T>> {
        if self.max_len.is_some_and(|max| self.len >= max) {
            return Err(InsertError {
                value,
                reason: "max queue length reached".into(),
            });
        }
        if let Err(e) = self.heap.try_reserve(1) {
            return Err(InsertError {
                value,
                reason: format!("heap allocation failed: {e}"),
            });
        }
        let index = match self.allocate_slot() {
            Ok(index) => index,
            Err(reason) => return Err(InsertError { value, reason }),
        };

        let slot = &mut self.slots[index];
        slot.value = Some(value);
        let handle = StoreHandle::new(index, slot.generation);
        self.heap.push(Reverse(HeapKey {
            due,
            seq: self.next_seq,
            handle,
        }));
        self.next_seq += 1;
        self.len += 1;
        Ok(handle)
    }

    fn peek_min(&mut self) -> Option<(StoreHandle, Timestamp)> {
        while let Some(Reverse(key)) = self.heap.peek().copied() {
            if self.is_live(key.handle) {
                return Some((key.handle, key.due));
            }
            self.heap.pop();
        }
        None
    }

    fn remove(&mut self, handle: StoreHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.slot())?;
        if slot.generation != handle.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.slot());
        self.len -= 1;
        self.maybe_compact();
        Some(value)
    }

    fn contains(&self, handle: StoreHandle) -> bool {
        self.is_live(handle)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn destroy_all(&mut self) -> Vec<T> {
        self.heap.clear();
        self.len = 0;
        let mut values = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index);
                values.push(value);
            }
        }
        values
    }
}
