//! Request-scoped value propagation.
//!
//! A [`Context`] is an immutable chain of key/value snapshots that is passed by
//! value down a reconcile call chain. Binding a value never mutates an existing
//! context; it produces a derived one. Sibling branches that each derive their
//! own context therefore never observe each other's bindings.
//!
//! Two slot flavours sit on top of the chain:
//! - [`StaticBinding`]: one slot per Rust type, keyed by `TypeId`
//! - [`DynamicBinding`]: many slots of one type, keyed by a caller-supplied
//!   function evaluated at bind time and again at lookup time

mod chain;
mod dynamic_binding;
mod static_binding;

pub use chain::{Context, ContextKey};
pub use dynamic_binding::DynamicBinding;
pub use static_binding::StaticBinding;

use thiserror::Error;

/// Misuse of a context slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BinderError {
    #[error("value already bound in context under key {0}")]
    AlreadyBound(ContextKey),

    #[error("no value bound in context under key {0}")]
    NotFound(ContextKey),

    #[error("value bound under key {key} is not a {expected}")]
    TypeMismatch { key: ContextKey, expected: &'static str },
}
