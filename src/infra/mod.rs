//! Infrastructure adapters: event stores and readiness pollers.

pub mod poller;
pub mod store;
