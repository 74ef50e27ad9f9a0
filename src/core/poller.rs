//! Readiness poller abstraction.

use std::io;

/// Multiplexer over the descriptors (or other readiness sources) of worker
/// processes.
///
/// Registration and draining of sources belong to the I/O layer; the scheduler
/// only calls [`poll`](Self::poll) and reads the ready count.
pub trait ReadinessPoller {
    /// Block for at most `timeout_ms` milliseconds and return how many sources
    /// became ready.
    ///
    /// An error of kind [`io::ErrorKind::Interrupted`] means the wait was cut
    /// short by a signal and is retried by the main loop. Any other error is
    /// treated as fatal for the loop.
    fn poll(&mut self, timeout_ms: u64) -> io::Result<usize>;

    /// Number of registered sources, for diagnostics.
    fn source_count(&self) -> usize;
}

impl<P: ReadinessPoller + ?Sized> ReadinessPoller for &mut P {
    fn poll(&mut self, timeout_ms: u64) -> io::Result<usize> {
        (**self).poll(timeout_ms)
    }

    fn source_count(&self) -> usize {
        (**self).source_count()
    }
}
