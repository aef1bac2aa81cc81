//! Structural comparator adapters.

pub mod json;

pub use json::JsonComparator;
