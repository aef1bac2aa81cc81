use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::builder::ConductorBuilder;
use super::state::{bind_state, RunState};
use crate::domain::context::Context;
use crate::domain::errors::{ReconcileError, ReconcileResult};
use crate::domain::models::{Descriptor, Outcome, Resource};
use crate::domain::ports::{Client, Reconciler, StatusConditionHandler};

/// Runs an ordered list of reconcilers against one parent at a time.
///
/// The registration list is configuration: it is fixed once built and reused
/// for every parent. Each call to [`Conductor::conduct`] gets its own
/// [`RunState`], so independent runs may execute concurrently.
pub struct Conductor<P: Resource> {
    pub(super) client: Client,
    pub(super) reconcilers: Vec<Arc<dyn Reconciler<P>>>,
    pub(super) status_handler: Option<Arc<dyn StatusConditionHandler<P>>>,
}

impl<P: Resource> Conductor<P> {
    pub fn builder() -> ConductorBuilder<P> {
        ConductorBuilder::new()
    }

    /// Conductor with no status handler.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            reconcilers: Vec::new(),
            status_handler: None,
        }
    }

    /// Append a reconciler to the end of the list.
    pub fn register<R>(&mut self, reconciler: R) -> &mut Self
    where
        R: Reconciler<P> + 'static,
    {
        self.reconcilers.push(Arc::new(reconciler));
        self
    }

    /// Append an already shared reconciler.
    pub fn register_shared(&mut self, reconciler: Arc<dyn Reconciler<P>>) -> &mut Self {
        self.reconcilers.push(reconciler);
        self
    }

    /// Descriptors of the registered reconcilers, in run order.
    pub fn describe(&self) -> Vec<Descriptor> {
        self.reconcilers.iter().map(|r| r.describe()).collect()
    }

    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Run every registered reconciler against `parent`, in order.
    ///
    /// Stops at the first reconciler that fails or asks for a requeue and
    /// returns its result without calling the status handler. When every
    /// reconciler is idle the status handler receives all recorded
    /// conditions, then the run returns idle.
    #[instrument(skip_all, fields(parent = %parent.key(), kind = P::KIND))]
    pub async fn conduct(&self, ctx: &Context, parent: &P) -> ReconcileResult<Outcome> {
        let state = Arc::new(RunState::new());
        let ctx = bind_state(ctx, Arc::clone(&state))?;

        let result = self.run(&ctx, &state, parent).await;

        state.release_context();
        result
    }

    /// Invoke a single reconciler with this conductor's client.
    ///
    /// Recording the outcome is the reconciler's job (see
    /// [`record_step_outcome`](super::record_step_outcome)), so a step run
    /// here and a step called directly with the run's context leave the same
    /// condition.
    pub async fn run_step(
        &self,
        ctx: &Context,
        parent: &P,
        reconciler: &dyn Reconciler<P>,
    ) -> ReconcileResult<Outcome> {
        reconciler.reconcile(ctx, &self.client, parent).await
    }

    async fn run(&self, ctx: &Context, state: &RunState, parent: &P) -> ReconcileResult<Outcome> {
        for reconciler in &self.reconcilers {
            let step = reconciler.describe().name;
            debug!(%step, "running reconciler");

            match self.run_step(ctx, parent, reconciler.as_ref()).await {
                Err(err) => {
                    warn!(%step, error = %err, "reconciler failed, stopping run");
                    return Err(err);
                }
                Ok(outcome) if outcome.needs_requeue() => {
                    debug!(%step, "reconciler requested requeue, stopping run");
                    return Ok(outcome);
                }
                Ok(_) => {}
            }
        }

        if let Some(handler) = &self.status_handler {
            let conditions = state.conditions();
            let ctx = state.context().unwrap_or_else(|| ctx.clone());
            handler
                .handle(&ctx, &self.client, parent, &conditions)
                .await
                .map_err(ReconcileError::Status)?;
            debug!(conditions = conditions.len(), "status conditions delivered");
        }

        info!(steps = self.reconcilers.len(), "parent converged");
        Ok(Outcome::idle())
    }
}
