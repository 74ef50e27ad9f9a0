//! Builders to construct schedulers from configuration.

use crate::config::SchedulerConfig;
use crate::core::{EventStore, ScheduledItem, Scheduler, SchedulerError, SharedScheduler};

/// Build a scheduler sized for the configured number of hosts and services.
pub fn build_scheduler<D: Send + 'static>(
    cfg: &SchedulerConfig,
) -> Result<Scheduler<D>, SchedulerError> {
    Scheduler::with_config(cfg, cfg.capacity_hint())
}

/// Build a scheduler over a custom store.
///
/// `store_factory` receives the initial capacity, `max(hint, floor)`.
pub fn build_scheduler_with<D, S, FS>(
    cfg: &SchedulerConfig,
    store_factory: FS,
) -> Result<Scheduler<D>, SchedulerError>
where
    D: Send + 'static,
    S: EventStore<ScheduledItem<D>> + Send + 'static,
    FS: FnOnce(usize) -> Result<S, SchedulerError>,
{
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    let capacity = cfg.capacity_hint().max(cfg.min_queue_capacity);
    let store = store_factory(capacity)?;
    Ok(Scheduler::with_store(store).with_max_poll_wait(cfg.max_poll_wait_ms))
}

/// Build a thread-shared scheduler from configuration.
pub fn build_shared_scheduler<D: Send + 'static>(
    cfg: &SchedulerConfig,
) -> Result<SharedScheduler<D>, SchedulerError> {
    build_scheduler(cfg).map(SharedScheduler::new)
}
