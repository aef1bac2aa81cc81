//! Domain errors for the convergence engine.

use thiserror::Error;

use crate::domain::context::BinderError;
use crate::domain::models::{ObjectKey, ObjectRef};

/// Errors returned by an object store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(ObjectRef),

    #[error("{0} already exists")]
    AlreadyExists(ObjectRef),

    #[error("conflict on {object}: expected resource version {expected}, found {actual}")]
    Conflict {
        object: ObjectRef,
        expected: String,
        actual: String,
    },

    #[error("invalid object: {0}")]
    Invalid(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether this is a lookup miss rather than a real failure.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Errors stamping an owner reference onto a child.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerLinkError {
    #[error("kind {kind} ({api_version}) is not registered")]
    UnregisteredKind { api_version: String, kind: String },

    #[error("{child} is already controlled by {kind} {name}")]
    AlreadyOwned {
        child: ObjectKey,
        kind: String,
        name: String,
    },

    #[error("cross-namespace owner reference: owner in {owner_namespace:?}, child in {child_namespace:?}")]
    CrossNamespace {
        owner_namespace: String,
        child_namespace: String,
    },
}

/// Everything that can stop a reconcile step.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Binder(#[from] BinderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("child key mismatch: expected {expected}, desired object has {actual}")]
    ChildKeyMismatch { expected: ObjectKey, actual: ObjectKey },

    #[error("failed to compute desired child: {0:#}")]
    Compute(#[source] anyhow::Error),

    #[error("pre-update hook failed: {0:#}")]
    PreUpdate(#[source] anyhow::Error),

    #[error(transparent)]
    OwnerLink(#[from] OwnerLinkError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("status handler failed: {0:#}")]
    Status(#[source] anyhow::Error),

    #[error("invalid reconciler configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{0:#}")]
    Step(#[source] anyhow::Error),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
