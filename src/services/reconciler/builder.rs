use std::sync::Arc;

use crate::adapters::JsonComparator;
use crate::domain::context::Context;
use crate::domain::errors::{ReconcileError, ReconcileResult};
use crate::domain::models::{
    Descriptor, DryRunPolicy, FieldPath, ObjectKey, ReconcilerDefaults, Resource,
};
use crate::domain::ports::StructuralComparator;

use super::simple::{ChildKeyFn, ComputeFn, ParentPredicate, PreUpdateFn, SimpleReconciler};

/// Builder for [`SimpleReconciler`].
///
/// Only the compute function is mandatory. The descriptor defaults to the
/// child kind, dry-run defaults to [`DryRunPolicy::Warn`] and the owner
/// reference is set unless skipped.
pub struct SimpleReconcilerBuilder<P: Resource, C: Resource> {
    details: Option<Descriptor>,
    compute: ComputeFn<P, C>,
    predicate: Option<ParentPredicate<P>>,
    skip_owner_reference: bool,
    dry_run: DryRunPolicy,
    exclusions: Vec<FieldPath>,
    should_delete: Option<ParentPredicate<P>>,
    child_key: Option<ChildKeyFn<P>>,
    pre_update: Option<PreUpdateFn<P, C>>,
    comparator: Option<Arc<dyn StructuralComparator>>,
}

impl<P: Resource, C: Resource> SimpleReconcilerBuilder<P, C> {
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(&Context, &P) -> anyhow::Result<C> + Send + Sync + 'static,
    {
        Self {
            details: None,
            compute: Arc::new(compute),
            predicate: None,
            skip_owner_reference: false,
            dry_run: DryRunPolicy::default(),
            exclusions: Vec::new(),
            should_delete: None,
            child_key: None,
            pre_update: None,
            comparator: None,
        }
    }

    pub fn with_details(mut self, details: Descriptor) -> Self {
        self.details = Some(details);
        self
    }

    /// Shorthand for a descriptor with only a name.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_details(Descriptor::new(name, ""))
    }

    /// Skip the whole reconcile (after deletion handling) when this returns false.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Delete the existing child when this returns true. Requires
    /// [`Self::with_child_key`].
    pub fn with_should_delete<F>(mut self, should_delete: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.should_delete = Some(Arc::new(should_delete));
        self
    }

    pub fn with_child_key<F>(mut self, child_key: F) -> Self
    where
        F: Fn(&P) -> ObjectKey + Send + Sync + 'static,
    {
        self.child_key = Some(Arc::new(child_key));
        self
    }

    pub fn with_pre_update<F>(mut self, pre_update: F) -> Self
    where
        F: Fn(&Context, &P, &C, &mut C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_update = Some(Arc::new(pre_update));
        self
    }

    pub const fn skip_owner_reference(mut self, skip: bool) -> Self {
        self.skip_owner_reference = skip;
        self
    }

    pub const fn with_dry_run(mut self, policy: DryRunPolicy) -> Self {
        self.dry_run = policy;
        self
    }

    pub fn add_compare_exclusions(mut self, exclusions: impl IntoIterator<Item = FieldPath>) -> Self {
        self.exclusions.extend(exclusions);
        self
    }

    pub fn with_comparator(mut self, comparator: Arc<dyn StructuralComparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Apply configured defaults: dry-run policy, owner reference and
    /// extra exclusions.
    pub fn with_defaults(mut self, defaults: &ReconcilerDefaults) -> ReconcileResult<Self> {
        for raw in &defaults.compare_exclusions {
            let path = FieldPath::parse(raw)
                .map_err(|e| ReconcileError::InvalidConfiguration(e.to_string()))?;
            self.exclusions.push(path);
        }
        self.dry_run = defaults.dry_run;
        self.skip_owner_reference = !defaults.set_owner_reference;
        Ok(self)
    }

    pub fn build(self) -> ReconcileResult<SimpleReconciler<P, C>> {
        if self.should_delete.is_some() && self.child_key.is_none() {
            return Err(ReconcileError::InvalidConfiguration(
                "a child key function is required when deletion is configured".to_string(),
            ));
        }

        let details = self.details.unwrap_or_else(|| Descriptor::new(C::KIND, ""));
        if details.name.is_empty() {
            return Err(ReconcileError::InvalidConfiguration(
                "reconciler name must not be empty".to_string(),
            ));
        }

        Ok(SimpleReconciler {
            details,
            compute: self.compute,
            predicate: self.predicate,
            skip_owner_reference: self.skip_owner_reference,
            dry_run: self.dry_run,
            exclusions: self.exclusions,
            should_delete: self.should_delete,
            child_key: self.child_key,
            pre_update: self.pre_update,
            comparator: self
                .comparator
                .unwrap_or_else(|| Arc::new(JsonComparator::new())),
        })
    }
}
