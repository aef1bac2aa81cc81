//! In-memory collaborators: object store and kind registry.

pub mod object_store;
pub mod scheme;

pub use object_store::{InMemoryObjectStore, StoreCall, StoreOperation};
pub use scheme::Scheme;
