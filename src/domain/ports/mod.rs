//! Port trait definitions (Hexagonal Architecture)
//!
//! The engine consumes its collaborators through these interfaces:
//! - `ObjectStore`: versioned get/create/update/delete of objects
//! - `StructuralComparator`: equality and diff with excluded subtrees
//! - `OwnerLinker`: stamping a controlling owner reference
//! - `StatusConditionHandler`: persisting a run's outcome records
//! - `Reconciler`: a single convergence step
pub mod comparator;
pub mod object_store;
pub mod owner_linker;
pub mod reconciler;
pub mod status_handler;

pub use comparator::StructuralComparator;
pub use object_store::{from_object, metadata_of, object_ref_of, to_object, Client, ObjectStore};
pub use owner_linker::OwnerLinker;
pub use reconciler::Reconciler;
pub use status_handler::{FnStatusHandler, StatusConditionHandler};
