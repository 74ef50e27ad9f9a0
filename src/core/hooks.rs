//! Collaborator hooks invoked by the main loop.

use crate::util::clock::Timestamp;

/// Housekeeping performed by the daemon when the loop observes a log-rotation
/// request.
pub trait LoopHooks {
    /// Rotate the main log file.
    fn rotate_log(&mut self, now: Timestamp);
    /// Refresh the persisted program status after rotation.
    fn update_program_status(&mut self);
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl LoopHooks for NoopHooks {
    fn rotate_log(&mut self, _now: Timestamp) {}

    fn update_program_status(&mut self) {}
}

impl<H: LoopHooks + ?Sized> LoopHooks for &mut H {
    fn rotate_log(&mut self, now: Timestamp) {
        (**self).rotate_log(now);
    }

    fn update_program_status(&mut self) {
        (**self).update_program_status();
    }
}
