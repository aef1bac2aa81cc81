//! Ordered execution of reconcilers against one parent.
//!
//! A [`Conductor`] runs its reconcilers in registration order, stops at the
//! first failure or requeue, and hands the outcome records of a fully
//! converged run to a status handler.

mod builder;
#[allow(clippy::module_inception)]
mod conductor;
mod state;

pub use builder::ConductorBuilder;
pub use conductor::Conductor;
pub use state::{bind_state, clear_state, fetch_state, record_step_outcome, RunState};
