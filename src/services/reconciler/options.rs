//! Comparison exclusions and predicate helpers for reconcilers.

use crate::domain::models::{FieldPath, Resource};

/// Ignore `metadata.annotations`.
pub fn ignore_annotations() -> FieldPath {
    FieldPath::from_segments(&["metadata", "annotations"])
}

/// Ignore `metadata.finalizers`.
pub fn ignore_finalizers() -> FieldPath {
    FieldPath::from_segments(&["metadata", "finalizers"])
}

/// Ignore `metadata.labels`.
pub fn ignore_labels() -> FieldPath {
    FieldPath::from_segments(&["metadata", "labels"])
}

/// Ignore the whole `status` subtree.
pub fn ignore_status() -> FieldPath {
    FieldPath::from_segments(&["status"])
}

/// Ignore server-side bookkeeping in `metadata.managedFields`.
pub fn ignore_managed_fields() -> FieldPath {
    FieldPath::from_segments(&["metadata", "managedFields"])
}

/// Ignore `apiVersion` and `kind`.
pub fn ignore_type_meta() -> [FieldPath; 2] {
    [FieldPath::from_segments(&["apiVersion"]), FieldPath::from_segments(&["kind"])]
}

/// Exclusions every reconciler applies on top of its own.
pub fn default_exclusions() -> Vec<FieldPath> {
    let mut exclusions = vec![ignore_status(), ignore_managed_fields()];
    exclusions.extend(ignore_type_meta());
    exclusions
}

/// Negate a parent predicate.
pub fn invert<P, F>(predicate: F) -> impl Fn(&P) -> bool + Send + Sync + 'static
where
    P: 'static,
    F: Fn(&P) -> bool + Send + Sync + 'static,
{
    move |parent: &P| !predicate(parent)
}

/// True while `parent` has no deletion timestamp.
pub fn is_not_marked_for_deletion<P: Resource>(parent: &P) -> bool {
    parent.metadata().deletion_timestamp.is_none()
}
