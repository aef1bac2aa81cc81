//! Domain layer for the Maestro convergence engine
//!
//! This module contains the context binder, object and condition models, the
//! error taxonomy, and the ports the engine's collaborators implement.

pub mod context;
pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{OwnerLinkError, ReconcileError, ReconcileResult, StoreError};
