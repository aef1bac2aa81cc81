//! Maestro - ordered reconciliation of child objects
//!
//! Maestro drives a parent object toward its desired state by running an
//! ordered list of reconcilers against it. Each reconciler converges one
//! child object in a versioned object store, and every step leaves an outcome
//! record that is handed to a status handler once the parent is converged.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): context binder, object models, errors, ports
//! - **Application Layer** (`application`): the conductor and its run state
//! - **Service Layer** (`services`): the single-child reconciler
//! - **Adapters** (`adapters`): in-memory store, kind registry, JSON comparator
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! let mut conductor = Conductor::builder().with_client(client).build()?;
//! conductor.register(
//!     SimpleReconciler::from_compute_fn(|_ctx: &Context, app: &WebApp| Ok(pod_for(app)))
//!         .build()?,
//! );
//! let outcome = conductor.conduct(&Context::background(), &app).await?;
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use adapters::{InMemoryObjectStore, JsonComparator, Scheme};
pub use application::{Conductor, ConductorBuilder, RunState};
pub use domain::context::{BinderError, Context, ContextKey, DynamicBinding, StaticBinding};
pub use domain::models::{
    Condition, ConditionStatus, Config, Descriptor, DryRunPolicy, FieldPath, ObjectKey,
    ObjectMeta, ObjectRef, Outcome, Resource,
};
pub use domain::ports::{Client, ObjectStore, Reconciler, StatusConditionHandler};
pub use domain::{OwnerLinkError, ReconcileError, ReconcileResult, StoreError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{SimpleReconciler, SimpleReconcilerBuilder};
