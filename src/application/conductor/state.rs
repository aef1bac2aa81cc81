//! Per-run state shared between the conductor and its reconcilers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::context::{BinderError, Context, StaticBinding};
use crate::domain::errors::ReconcileResult;
use crate::domain::models::{Condition, ConditionStatus, Descriptor, Outcome};

static STATE_BINDING: StaticBinding<RunState> = StaticBinding::new();

/// Accumulates outcome records for exactly one conductor run.
///
/// Conditions are append-only. The state also keeps the context it was bound
/// into, so a reconciler deep in the call chain can rebind extra values and
/// still have them seen by whoever finishes the run.
#[derive(Debug, Default)]
pub struct RunState {
    conditions: Mutex<Vec<Condition>>,
    context: Mutex<Option<Context>>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_condition(&self, condition: Condition) {
        lock(&self.conditions).push(condition);
    }

    /// Snapshot of the conditions recorded so far, in insertion order.
    pub fn conditions(&self) -> Vec<Condition> {
        lock(&self.conditions).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.conditions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the back-reference to the latest context.
    pub fn update_context(&self, ctx: Context) {
        *lock(&self.context) = Some(ctx);
    }

    /// The latest context this state was bound into or updated with.
    pub fn context(&self) -> Option<Context> {
        lock(&self.context).clone()
    }

    /// Drop the context back-reference.
    ///
    /// The bound context holds this state and this state holds the context, so
    /// the cycle has to be cut when the run ends.
    pub fn release_context(&self) {
        lock(&self.context).take();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bind `state` into a context derived from `ctx`.
pub fn bind_state(ctx: &Context, state: Arc<RunState>) -> Result<Context, BinderError> {
    let ctx = STATE_BINDING.bind(ctx, Arc::clone(&state))?;
    state.update_context(ctx.clone());
    Ok(ctx)
}

/// Derive a context with no run state bound.
pub fn clear_state(ctx: &Context) -> Context {
    STATE_BINDING.unbind(ctx)
}

pub fn fetch_state(ctx: &Context) -> Result<Arc<RunState>, BinderError> {
    STATE_BINDING.from_context(ctx)
}

/// Record a step's result on the run state bound in `ctx`, if there is one.
///
/// Success yields `<Name>Reconciled`, with status `False` while the step still
/// wants a requeue. Failure yields `<Name>Error` carrying the error text.
/// Without a bound run state this is a no-op.
pub fn record_step_outcome(ctx: &Context, descriptor: &Descriptor, result: &ReconcileResult<Outcome>) {
    let Ok(state) = fetch_state(ctx) else {
        return;
    };

    let condition = match result {
        Ok(outcome) => Condition::new(
            format!("{}Reconciled", descriptor.name),
            ConditionStatus::from(!outcome.needs_requeue()),
            "Reconciled",
            "Reconciled successfully",
        ),
        Err(err) => Condition::new(
            format!("{}Error", descriptor.name),
            ConditionStatus::True,
            "ReconcileError",
            err.to_string(),
        ),
    };
    state.add_condition(condition);
}
