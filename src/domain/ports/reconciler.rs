use async_trait::async_trait;

use crate::domain::context::Context;
use crate::domain::errors::ReconcileResult;
use crate::domain::models::{Descriptor, Outcome, Resource};
use crate::domain::ports::Client;

/// One unit of convergence work for a parent object.
#[async_trait]
pub trait Reconciler<P: Resource>: Send + Sync {
    /// Converge whatever this step owns for `parent`.
    ///
    /// Implementations record their result with
    /// [`record_step_outcome`](crate::application::record_step_outcome) so
    /// the bound run state sees it however the step was invoked.
    async fn reconcile(&self, ctx: &Context, client: &Client, parent: &P) -> ReconcileResult<Outcome>;

    /// Name and description, used for condition types and logs.
    fn describe(&self) -> Descriptor;
}
