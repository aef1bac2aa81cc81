//! Single-child reconciler.
//!
//! Converges exactly one child object per invocation: optional deletion,
//! gating, computing the desired child, then create, compare and update
//! against the store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::application::record_step_outcome;
use crate::domain::context::Context;
use crate::domain::errors::{ReconcileError, ReconcileResult};
use crate::domain::models::{Descriptor, DryRunPolicy, FieldPath, ObjectKey, Outcome, Resource};
use crate::domain::ports::{Client, Reconciler, StructuralComparator};

use super::builder::SimpleReconcilerBuilder;
use super::options::default_exclusions;

/// Produces the desired child from the parent.
pub type ComputeFn<P, C> = Arc<dyn Fn(&Context, &P) -> anyhow::Result<C> + Send + Sync>;
/// Boolean test on the parent.
pub type ParentPredicate<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;
/// Namespace and name the child is expected to have.
pub type ChildKeyFn<P> = Arc<dyn Fn(&P) -> ObjectKey + Send + Sync>;
/// Last chance to adjust the desired child before an update: `(ctx, parent, current, desired)`.
pub type PreUpdateFn<P, C> =
    Arc<dyn Fn(&Context, &P, &C, &mut C) -> anyhow::Result<()> + Send + Sync>;

/// Reconciles one child object of type `C` for a parent of type `P`.
pub struct SimpleReconciler<P: Resource, C: Resource> {
    pub(super) details: Descriptor,
    pub(super) compute: ComputeFn<P, C>,
    pub(super) predicate: Option<ParentPredicate<P>>,
    pub(super) skip_owner_reference: bool,
    pub(super) dry_run: DryRunPolicy,
    pub(super) exclusions: Vec<FieldPath>,
    pub(super) should_delete: Option<ParentPredicate<P>>,
    pub(super) child_key: Option<ChildKeyFn<P>>,
    pub(super) pre_update: Option<PreUpdateFn<P, C>>,
    pub(super) comparator: Arc<dyn StructuralComparator>,
}

impl<P: Resource, C: Resource> SimpleReconciler<P, C> {
    /// Start building a reconciler around `compute`.
    pub fn from_compute_fn<F>(compute: F) -> SimpleReconcilerBuilder<P, C>
    where
        F: Fn(&Context, &P) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        SimpleReconcilerBuilder::new(compute)
    }

    pub const fn dry_run_policy(&self) -> DryRunPolicy {
        self.dry_run
    }

    /// Caller exclusions followed by the ones always applied.
    pub fn exclusions(&self) -> Vec<FieldPath> {
        let mut exclusions = self.exclusions.clone();
        exclusions.extend(default_exclusions());
        exclusions
    }

    #[instrument(
        skip_all,
        fields(step = %self.details.name, parent = %parent.key(), kind = C::KIND)
    )]
    async fn converge(&self, ctx: &Context, client: &Client, parent: &P) -> ReconcileResult<Outcome> {
        let child_key = self.child_key.as_ref().map(|key_fn| key_fn(parent));

        if let Some(should_delete) = &self.should_delete {
            let key = child_key.as_ref().ok_or_else(|| {
                ReconcileError::InvalidConfiguration(
                    "a child key function is required when deletion is configured".to_string(),
                )
            })?;
            match client.get::<C>(ctx, key).await {
                Ok(current) if should_delete(parent) => {
                    client.delete(ctx, &current).await?;
                    info!(child = %key, "deleted child");
                    return Ok(Outcome::requeue());
                }
                Ok(_) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(predicate) = &self.predicate {
            if !predicate(parent) {
                debug!("predicate not satisfied, skipping");
                return Ok(Outcome::idle());
            }
        }

        let mut desired = (self.compute)(ctx, parent).map_err(ReconcileError::Compute)?;

        if let Some(expected) = &child_key {
            let meta = desired.metadata_mut();
            if meta.name.is_empty() {
                meta.name.clone_from(&expected.name);
            }
            if meta.namespace.is_empty() {
                meta.namespace.clone_from(&expected.namespace);
            }
            let actual = desired.key();
            if actual != *expected {
                return Err(ReconcileError::ChildKeyMismatch {
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let key = desired.key();

        if !self.skip_owner_reference {
            client.set_controller_reference(parent, &mut desired)?;
        }

        let current = match client.get::<C>(ctx, &key).await {
            Ok(current) => current,
            Err(err) if err.is_not_found() => {
                client.create(ctx, &mut desired).await?;
                info!(child = %key, "created child");
                return Ok(Outcome::requeue());
            }
            Err(err) => {
                error!(child = %key, error = %err, "unable to fetch child");
                return Err(err.into());
            }
        };

        // Server-assigned fields come from the stored object so they never
        // register as a difference.
        {
            let stored = current.metadata();
            let meta = desired.metadata_mut();
            meta.resource_version.clone_from(&stored.resource_version);
            meta.creation_timestamp = stored.creation_timestamp;
            meta.generation = stored.generation;
            meta.uid = stored.uid;
        }

        if let Some(pre_update) = &self.pre_update {
            pre_update(ctx, parent, &current, &mut desired).map_err(ReconcileError::PreUpdate)?;
        }

        let exclusions = self.exclusions();
        let current_value = serde_json::to_value(&current)?;
        let desired_value = serde_json::to_value(&desired)?;
        if self.comparator.equal(&current_value, &desired_value, &exclusions) {
            debug!(child = %key, "no changes");
            return Ok(Outcome::idle());
        }

        if self.dry_run != DryRunPolicy::None
            && self
                .converged_after_dry_run(ctx, client, &current, &desired, &exclusions)
                .await?
        {
            if self.dry_run == DryRunPolicy::Warn {
                let diff = self.comparator.diff(&current_value, &desired_value, &exclusions);
                warn!(
                    child = %key,
                    %diff,
                    "no changes after dry-run; add the store defaults to the computed child or exclude these fields"
                );
            }
            return Ok(Outcome::idle());
        }

        debug!(child = %key, "updating child");
        client.update(ctx, &mut desired, false).await?;
        info!(child = %key, "updated child");
        Ok(Outcome::requeue())
    }

    /// Dry-run both sides and report whether the store would normalize them
    /// to the same object.
    ///
    /// Both are applied because store-side defaulting only shows up on
    /// values that pass through a write.
    async fn converged_after_dry_run(
        &self,
        ctx: &Context,
        client: &Client,
        current: &C,
        desired: &C,
        exclusions: &[FieldPath],
    ) -> ReconcileResult<bool> {
        let key = desired.key();

        let mut desired_applied = desired.clone();
        if let Err(err) = client.update(ctx, &mut desired_applied, true).await {
            error!(child = %key, error = %err, "unable to dry-run desired child");
            return Err(err.into());
        }

        let mut current_applied = current.clone();
        if let Err(err) = client.update(ctx, &mut current_applied, true).await {
            error!(child = %key, error = %err, "unable to dry-run current child");
            return Err(err.into());
        }

        Ok(self.comparator.equal(
            &serde_json::to_value(&current_applied)?,
            &serde_json::to_value(&desired_applied)?,
            exclusions,
        ))
    }
}

#[async_trait]
impl<P: Resource, C: Resource> Reconciler<P> for SimpleReconciler<P, C> {
    /// Converge the child and, when `ctx` carries a run state, record the
    /// result on it.
    async fn reconcile(&self, ctx: &Context, client: &Client, parent: &P) -> ReconcileResult<Outcome> {
        let result = self.converge(ctx, client, parent).await;
        record_step_outcome(ctx, &self.details, &result);
        result
    }

    fn describe(&self) -> Descriptor {
        self.details.clone()
    }
}
