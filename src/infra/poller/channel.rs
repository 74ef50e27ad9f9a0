//! Channel-backed readiness poller.
//!
//! Worker threads (or the threads reading worker pipes) hold a
//! [`ReadinessSender`] and call [`ReadinessSender::notify`] when they have data
//! for the daemon. The main loop's poll wakes on the first notification,
//! drains any others already queued, and reports their count. The I/O layer
//! collects which sources fired with [`ChannelPoller::take_ready`].

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::trace;

use crate::core::ReadinessPoller;
use crate::util::telemetry::TARGET_IPC;

/// Identifier of one registered readiness source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source-{}", self.0)
    }
}

/// Sending half handed to one readiness source. Dropping it deregisters the
/// source.
#[derive(Debug)]
pub struct ReadinessSender {
    id: SourceId,
    tx: Sender<SourceId>,
    registered: Arc<AtomicUsize>,
}

impl ReadinessSender {
    /// Identifier of this source.
    pub const fn id(&self) -> SourceId {
        self.id
    }

    /// Mark the source ready. Returns `false` once the poller is gone.
    pub fn notify(&self) -> bool {
        self.tx.send(self.id).is_ok()
    }
}

impl Drop for ReadinessSender {
    fn drop(&mut self) {
        self.registered.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Readiness poller fed by [`ReadinessSender`]s over a crossbeam channel.
pub struct ChannelPoller {
    tx: Sender<SourceId>,
    rx: Receiver<SourceId>,
    registered: Arc<AtomicUsize>,
    next_id: AtomicU64,
    ready: Vec<SourceId>,
}

impl fmt::Debug for ChannelPoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelPoller")
            .field("registered", &self.registered.load(Ordering::Acquire))
            .field("ready", &self.ready.len())
            .finish_non_exhaustive()
    }
}

impl Default for ChannelPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelPoller {
    /// Create a poller with no sources.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            registered: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(0),
            ready: Vec::new(),
        }
    }

    /// Register a new source.
    pub fn register(&self) -> ReadinessSender {
        let id = SourceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registered.fetch_add(1, Ordering::AcqRel);
        ReadinessSender {
            id,
            tx: self.tx.clone(),
            registered: Arc::clone(&self.registered),
        }
    }

    /// Sources reported ready by past polls, oldest first. Clears the list.
    pub fn take_ready(&mut self) -> Vec<SourceId> {
        std::mem::take(&mut self.ready)
    }

    fn drain_queued(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(id) = self.rx.try_recv() {
            self.ready.push(id);
            drained += 1;
        }
        drained
    }
}

impl ReadinessPoller for ChannelPoller {
    fn poll(&mut self, timeout_ms: u64) -> io::Result<usize> {
        let first = match self.rx.recv_timeout(Duration::from_millis(timeout_ms)) {
            Ok(id) => id,
            Err(RecvTimeoutError::Timeout) => return Ok(0),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "readiness channel disconnected",
                ));
            }
        };
        self.ready.push(first);
        let inputs = 1 + self.drain_queued();
        trace!(target: TARGET_IPC, inputs, "readiness notifications drained");
        Ok(inputs)
    }

    fn source_count(&self) -> usize {
        self.registered.load(Ordering::Acquire)
    }
}
