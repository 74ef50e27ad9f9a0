//! Poller for daemons without worker descriptors.

use std::io;
use std::thread;
use std::time::Duration;

use crate::core::ReadinessPoller;

/// Poller with no sources: every poll sleeps for the full timeout and reports
/// no readiness, so the main loop degenerates into a plain timer loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePoller;

impl ReadinessPoller for IdlePoller {
    fn poll(&mut self, timeout_ms: u64) -> io::Result<usize> {
        if timeout_ms > 0 {
            thread::sleep(Duration::from_millis(timeout_ms));
        }
        Ok(0)
    }

    fn source_count(&self) -> usize {
        0
    }
}
