//! Kind registry that stamps controller references.

use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::errors::OwnerLinkError;
use crate::domain::models::{ObjectKey, ObjectMeta, ObjectRef, OwnerReference, Resource};
use crate::domain::ports::OwnerLinker;

/// Registry of known `(apiVersion, kind)` pairs.
#[derive(Debug, Clone, Default)]
pub struct Scheme {
    kinds: HashSet<(String, String)>,
}

impl Scheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the type `R`.
    #[must_use]
    pub fn with<R: Resource>(mut self) -> Self {
        self.register::<R>();
        self
    }

    pub fn register<R: Resource>(&mut self) {
        self.register_kind(R::API_VERSION, R::KIND);
    }

    pub fn register_kind(&mut self, api_version: impl Into<String>, kind: impl Into<String>) {
        self.kinds.insert((api_version.into(), kind.into()));
    }

    pub fn is_registered(&self, api_version: &str, kind: &str) -> bool {
        self.kinds
            .contains(&(api_version.to_string(), kind.to_string()))
    }
}

impl OwnerLinker for Scheme {
    fn set_controller_reference(
        &self,
        owner: &ObjectRef,
        owner_uid: Option<Uuid>,
        child: &mut ObjectMeta,
    ) -> Result<(), OwnerLinkError> {
        if !self.is_registered(&owner.api_version, &owner.kind) {
            return Err(OwnerLinkError::UnregisteredKind {
                api_version: owner.api_version.clone(),
                kind: owner.kind.clone(),
            });
        }

        // A namespaced owner may only own objects in its own namespace.
        if !owner.namespace.is_empty() && owner.namespace != child.namespace {
            return Err(OwnerLinkError::CrossNamespace {
                owner_namespace: owner.namespace.clone(),
                child_namespace: child.namespace.clone(),
            });
        }

        let same_owner = |r: &OwnerReference| {
            api_group(&r.api_version) == api_group(&owner.api_version)
                && r.kind == owner.kind
                && r.name == owner.name
        };

        if let Some(existing) = child.controller() {
            if !same_owner(existing) {
                return Err(OwnerLinkError::AlreadyOwned {
                    child: ObjectKey::new(child.namespace.clone(), child.name.clone()),
                    kind: existing.kind.clone(),
                    name: existing.name.clone(),
                });
            }
        }

        child.owner_references.retain(|r| !same_owner(r));
        child.owner_references.push(OwnerReference {
            api_version: owner.api_version.clone(),
            kind: owner.kind.clone(),
            name: owner.name.clone(),
            uid: owner_uid,
            controller: true,
            block_owner_deletion: true,
        });
        Ok(())
    }
}

/// Group part of an `apiVersion`; empty for the core group (`v1`).
fn api_group(api_version: &str) -> &str {
    api_version.rsplit_once('/').map_or("", |(group, _)| group)
}
