//! Event store backends.

pub mod heap;

pub use heap::HeapEventStore;
