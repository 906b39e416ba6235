//! In-memory backend for exercising cursors without a remote store.
//!
//! [`MemoryEngine`] implements both the engine and catalog sides of the
//! core's boundary over tables registered up front, and exposes session
//! and fetch counters so tests can assert that execution is lazy and
//! that every session gets released.

pub mod engine;
pub mod table;

pub use engine::MemoryEngine;
pub use table::MemoryTable;
