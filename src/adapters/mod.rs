//! Adapters implementing the domain ports.
//!
//! - `memory`: versioned in-memory object store and kind registry
//! - `compare`: JSON structural comparator

pub mod compare;
pub mod memory;

pub use compare::JsonComparator;
pub use memory::{InMemoryObjectStore, Scheme, StoreCall, StoreOperation};
