//! Process-level request flags observed by the main loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Flags {
    shutdown: AtomicBool,
    restart: AtomicBool,
    rotate: AtomicBool,
}

/// Shutdown, restart and log-rotation requests.
///
/// The signal layer sets these from any thread; clones share state. The main
/// loop reads shutdown and restart at the top of every iteration and consumes
/// the rotation request when it acts on it.
#[derive(Debug, Clone, Default)]
pub struct SignalFlags {
    inner: Arc<Flags>,
}

impl SignalFlags {
    /// Create a set with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the main loop to exit for shutdown.
    pub fn request_shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
    }

    /// Ask the main loop to exit for restart.
    pub fn request_restart(&self) {
        self.inner.restart.store(true, Ordering::SeqCst);
    }

    /// Ask the main loop to rotate the log on its next iteration.
    pub fn request_log_rotation(&self) {
        self.inner.rotate.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown was requested.
    pub fn shutdown_requested(&self) -> bool {
        self.inner.shutdown.load(Ordering::SeqCst)
    }

    /// Whether restart was requested.
    pub fn restart_requested(&self) -> bool {
        self.inner.restart.load(Ordering::SeqCst)
    }

    /// Whether log rotation is pending.
    pub fn log_rotation_requested(&self) -> bool {
        self.inner.rotate.load(Ordering::SeqCst)
    }

    /// Clear and return the pending log-rotation request.
    pub fn take_log_rotation(&self) -> bool {
        self.inner.rotate.swap(false, Ordering::SeqCst)
    }

    /// Clear shutdown and restart, e.g. before re-entering the loop after a restart.
    pub fn reset(&self) {
        self.inner.shutdown.store(false, Ordering::SeqCst);
        self.inner.restart.store(false, Ordering::SeqCst);
    }
}
