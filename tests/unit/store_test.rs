//! Tests for event store backends

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use timed_events::core::{
    EventStore, ExecReason, InsertError, LoopExit, NoopHooks, Scheduler, StoreHandle,
};
use timed_events::infra::poller::IdlePoller;
use timed_events::infra::store::HeapEventStore;
use timed_events::util::Timestamp;

#[test]
fn test_heap_store_matches_sorted_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut store = HeapEventStore::with_capacity(16);
    // (due, insertion order, handle, value)
    let mut model: Vec<(Timestamp, usize, StoreHandle, usize)> = Vec::new();

    for step in 0..2_000 {
        match rng.random_range(0..3) {
            0 | 1 => {
                let due = Timestamp::from(rng.random_range(0u32..50));
                let handle = store.insert(due, step).unwrap();
                model.push((due, step, handle, step));
            }
            _ if !model.is_empty() => {
                let victim = model.swap_remove(rng.random_range(0..model.len()));
                assert_eq!(store.remove(victim.2), Some(victim.3));
                assert_eq!(store.remove(victim.2), None);
            }
            _ => {}
        }

        let expected = model
            .iter()
            .min_by_key(|(due, order, _, _)| (*due, *order))
            .map(|(due, _, handle, _)| (*handle, *due));
        assert_eq!(store.peek_min(), expected);
        assert_eq!(store.len(), model.len());
    }

    model.sort_by_key(|(due, order, _, _)| (*due, *order));
    for (due, _, handle, value) in model {
        assert_eq!(store.peek_min(), Some((handle, due)));
        assert_eq!(store.remove(handle), Some(value));
    }
    assert!(store.is_empty());
}

/// Store that keeps at most one entry, used to exercise the store seam.
struct SingleSlotStore<T> {
    entry: Option<(Timestamp, T)>,
    generation: u32,
}

impl<T> SingleSlotStore<T> {
    const fn new() -> Self {
        Self {
            entry: None,
            generation: 0,
        }
    }
}

impl<T> EventStore<T> for SingleSlotStore<T> {
    fn insert(&mut self, due: Timestamp, value: T) -> Result<StoreHandle, InsertError<T>> {
        if self.entry.is_some() {
            return Err(InsertError {
                value,
                reason: "slot occupied".into(),
            });
        }
        self.generation += 1;
        self.entry = Some((due, value));
        Ok(StoreHandle::new(0, self.generation))
    }

    fn peek_min(&mut self) -> Option<(StoreHandle, Timestamp)> {
        self.entry
            .as_ref()
            .map(|(due, _)| (StoreHandle::new(0, self.generation), *due))
    }

    fn remove(&mut self, handle: StoreHandle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        self.entry.take().map(|(_, value)| value)
    }

    fn contains(&self, handle: StoreHandle) -> bool {
        self.entry.is_some() && handle == StoreHandle::new(0, self.generation)
    }

    fn len(&self) -> usize {
        usize::from(self.entry.is_some())
    }

    fn destroy_all(&mut self) -> Vec<T> {
        self.entry.take().map(|(_, value)| value).into_iter().collect()
    }
}

#[test]
fn test_scheduler_over_custom_store() {
    let mut sched: Scheduler<&'static str> = Scheduler::with_store(SingleSlotStore::new());

    let first = sched.schedule(
        Duration::ZERO,
        |_, meta| assert_eq!(meta.reason, ExecReason::Timed),
        "a",
    );
    let refused = sched.schedule(Duration::ZERO, |_, _| {}, "b");
    assert!(!first.is_degenerate());
    assert!(refused.is_degenerate());

    let exit = sched.run_loop(IdlePoller, NoopHooks);
    assert!(matches!(exit, LoopExit::QueueEmpty));
    assert!(!sched.contains(first));
    assert_eq!(sched.degenerate_count(), 1);
    assert_eq!(sched.shutdown(), 1);
}
