//! Child-object reconcilers.
//!
//! [`SimpleReconciler`] converges one child per parent: compute the desired
//! object, create it when missing, and update it only when a structural
//! comparison (optionally confirmed by store dry-runs) shows real drift.

pub mod builder;
pub mod options;
pub mod simple;

pub use builder::SimpleReconcilerBuilder;
pub use options::{
    default_exclusions, ignore_annotations, ignore_finalizers, ignore_labels,
    ignore_managed_fields, ignore_status, ignore_type_meta, invert, is_not_marked_for_deletion,
};
pub use simple::{ChildKeyFn, ComputeFn, ParentPredicate, PreUpdateFn, SimpleReconciler};
