use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::domain::context::Context;
use crate::domain::errors::{OwnerLinkError, StoreError};
use crate::domain::models::{ObjectKey, ObjectMeta, ObjectRef, Resource};
use crate::domain::ports::OwnerLinker;

/// Port for the versioned object repository.
///
/// Objects travel as JSON values carrying `apiVersion`, `kind` and `metadata`.
/// Implementations must report a missing object as [`StoreError::NotFound`]
/// and keep every other failure distinct from it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the stored object.
    async fn get(&self, ctx: &Context, object: &ObjectRef) -> Result<Value, StoreError>;

    /// Persist a new object and return it as stored.
    async fn create(&self, ctx: &Context, object: Value) -> Result<Value, StoreError>;

    /// Replace an existing object, guarded by its resource version.
    ///
    /// With `dry_run` the write is validated and normalized, and the result is
    /// returned without being persisted.
    async fn update(&self, ctx: &Context, object: Value, dry_run: bool)
        -> Result<Value, StoreError>;

    /// Remove an object.
    async fn delete(&self, ctx: &Context, object: &ObjectRef) -> Result<(), StoreError>;
}

/// Read the reference out of a wire object.
pub fn object_ref_of(object: &Value) -> Result<ObjectRef, StoreError> {
    let field = |name: &str| -> Result<String, StoreError> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StoreError::Invalid(format!("object is missing {name}")))
    };
    let meta = metadata_of(object)?;
    if meta.name.is_empty() {
        return Err(StoreError::Invalid("object has no name".to_string()));
    }
    Ok(ObjectRef {
        api_version: field("apiVersion")?,
        kind: field("kind")?,
        namespace: meta.namespace,
        name: meta.name,
    })
}

/// Decode the metadata block of a wire object.
pub fn metadata_of(object: &Value) -> Result<ObjectMeta, StoreError> {
    let meta = object
        .get("metadata")
        .cloned()
        .ok_or_else(|| StoreError::Invalid("object has no metadata".to_string()))?;
    Ok(serde_json::from_value(meta)?)
}

/// Encode a typed object, including its type metadata.
pub fn to_object<R: Resource>(resource: &R) -> Result<Value, StoreError> {
    let mut value = serde_json::to_value(resource)?;
    let map = value
        .as_object_mut()
        .ok_or_else(|| StoreError::Invalid(format!("{} does not encode as an object", R::KIND)))?;
    map.insert("apiVersion".into(), Value::String(R::API_VERSION.into()));
    map.insert("kind".into(), Value::String(R::KIND.into()));
    Ok(value)
}

/// Decode a wire object into a typed one.
pub fn from_object<R: Resource>(object: Value) -> Result<R, StoreError> {
    Ok(serde_json::from_value(object)?)
}

/// Typed facade over an [`ObjectStore`] and an [`OwnerLinker`].
///
/// This is what reconcilers and status handlers receive; it is cheap to clone.
#[derive(Clone)]
pub struct Client {
    store: Arc<dyn ObjectStore>,
    owner_linker: Arc<dyn OwnerLinker>,
}

impl Client {
    pub fn new(store: Arc<dyn ObjectStore>, owner_linker: Arc<dyn OwnerLinker>) -> Self {
        Self {
            store,
            owner_linker,
        }
    }

    /// The underlying untyped store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub async fn get<R: Resource>(&self, ctx: &Context, key: &ObjectKey) -> Result<R, StoreError> {
        let value = self.store.get(ctx, &ObjectRef::of::<R>(key)).await?;
        from_object(value)
    }

    /// Create `resource`, refreshing it with the stored state.
    pub async fn create<R: Resource>(&self, ctx: &Context, resource: &mut R) -> Result<(), StoreError> {
        let stored = self.store.create(ctx, to_object(resource)?).await?;
        *resource = from_object(stored)?;
        Ok(())
    }

    /// Update `resource`, refreshing it with the stored (or dry-run) state.
    pub async fn update<R: Resource>(
        &self,
        ctx: &Context,
        resource: &mut R,
        dry_run: bool,
    ) -> Result<(), StoreError> {
        let stored = self.store.update(ctx, to_object(resource)?, dry_run).await?;
        *resource = from_object(stored)?;
        Ok(())
    }

    pub async fn delete<R: Resource>(&self, ctx: &Context, resource: &R) -> Result<(), StoreError> {
        self.store.delete(ctx, &resource.object_ref()).await
    }

    /// Mark `owner` as the controller of `child`.
    pub fn set_controller_reference<P: Resource, C: Resource>(
        &self,
        owner: &P,
        child: &mut C,
    ) -> Result<(), OwnerLinkError> {
        self.owner_linker.set_controller_reference(
            &owner.object_ref(),
            owner.metadata().uid,
            child.metadata_mut(),
        )
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}
