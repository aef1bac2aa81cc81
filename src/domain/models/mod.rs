//! Domain models for the convergence engine.

pub mod condition;
pub mod config;
pub mod field_path;
pub mod object;
pub mod outcome;

pub use condition::{
    find_condition, merge_conditions, set_status_condition, Condition, ConditionStatus,
};
pub use config::{Config, DryRunPolicy, LoggingConfig, ReconcilerDefaults};
pub use field_path::{FieldPath, InvalidFieldPath};
pub use object::{ObjectKey, ObjectMeta, ObjectRef, OwnerReference, Resource, TypeMeta};
pub use outcome::{Descriptor, Outcome};
