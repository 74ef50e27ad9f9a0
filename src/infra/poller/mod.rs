//! Readiness poller backends.

#[cfg(not(target_arch = "wasm32"))]
pub mod channel;
pub mod idle;

#[cfg(not(target_arch = "wasm32"))]
pub use channel::{ChannelPoller, ReadinessSender, SourceId};
pub use idle::IdlePoller;
