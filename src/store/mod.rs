//! Store module — the persistent associative table.
//!
//! This module provides:
//! - `HashIndex`, the fixed-capacity double-hashed table (`index`)
//! - The escaped line format of the backing files (`format`)
//! - `RecordStore`, a table bound to a backing file (`record_store`)

pub mod format;
pub mod index;
pub mod record_store;

// Re-export the most commonly used items.
pub use index::{HashIndex, Record, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use record_store::RecordStore;
