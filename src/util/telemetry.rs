//! Telemetry helpers for structured logging and tracing.

/// Log target for event lifecycle traces (scheduling, firing, cancellation).
pub const TARGET_EVENTS: &str = "timed_events::events";

/// Log target for main-loop scheduling decisions (poll timeouts, queue size).
pub const TARGET_SCHEDULING: &str = "timed_events::scheduling";

/// Log target for readiness poller activity.
pub const TARGET_IPC: &str = "timed_events::ipc";

/// Initialize tracing/telemetry. Users can install their own subscriber; this
/// helper installs a default env-based subscriber if none is set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
