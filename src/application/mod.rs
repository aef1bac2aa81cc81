//! Application layer: orchestration of reconcilers for a parent object.

pub mod conductor;

pub use conductor::{
    bind_state, clear_state, fetch_state, record_step_outcome, Conductor, ConductorBuilder,
    RunState,
};
