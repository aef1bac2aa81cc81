//! In-memory object store.
//!
//! Behaves like a small versioned API server: it assigns identity and
//! bookkeeping metadata, enforces optimistic concurrency on resource version,
//! supports dry-run updates and per-kind defaulting, and records every call so
//! tests can assert on store traffic.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;
use tracing::trace;
use uuid::Uuid;

use crate::domain::context::Context;
use crate::domain::errors::StoreError;
use crate::domain::models::{ObjectMeta, ObjectRef, Resource};
use crate::domain::ports::{from_object, metadata_of, object_ref_of, to_object, ObjectStore};

type Defaulter = Arc<dyn Fn(&mut Value) + Send + Sync>;

/// Kind of store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Create,
    Update,
    DryRunUpdate,
    Delete,
}

/// One recorded store call.
#[derive(Debug, Clone)]
pub struct StoreCall {
    pub operation: StoreOperation,
    pub object: ObjectRef,
    /// The object as submitted, for writes.
    pub payload: Option<Value>,
}

/// Versioned in-memory [`ObjectStore`].
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectRef, Value>>,
    revision: AtomicU64,
    defaulters: HashMap<String, Vec<Defaulter>>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<HashMap<StoreOperation, StoreError>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            revision: AtomicU64::new(0),
            defaulters: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Register a defaulting function run on every write of `kind`,
    /// including dry runs.
    #[must_use]
    pub fn with_defaulter<F>(mut self, kind: impl Into<String>, defaulter: F) -> Self
    where
        F: Fn(&mut Value) + Send + Sync + 'static,
    {
        self.defaulters
            .entry(kind.into())
            .or_default()
            .push(Arc::new(defaulter));
        self
    }

    /// Store `resource` directly, without recording a call.
    pub async fn seed<R: Resource>(&self, resource: &R) -> Result<R, StoreError> {
        let stored = self.insert(to_object(resource)?).await?;
        from_object(stored)
    }

    /// Stored value of an object, without recording a call.
    pub async fn snapshot(&self, object: &ObjectRef) -> Option<Value> {
        self.objects.read().await.get(object).cloned()
    }

    /// Typed stored object, without recording a call.
    pub async fn find<R: Resource>(&self, object: &ObjectRef) -> Option<R> {
        self.snapshot(object)
            .await
            .and_then(|value| from_object(value).ok())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Number of recorded calls of `operation`.
    pub fn count(&self, operation: StoreOperation) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Number of recorded writes of any kind.
    pub fn write_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.operation != StoreOperation::Get)
            .count()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: StoreOperation, error: StoreError) {
        lock(&self.failures).insert(operation, error);
    }

    fn record(&self, operation: StoreOperation, object: &ObjectRef, payload: Option<&Value>) {
        trace!(?operation, %object, "store call");
        lock(&self.calls).push(StoreCall {
            operation,
            object: object.clone(),
            payload: payload.cloned(),
        });
    }

    fn injected_failure(&self, operation: StoreOperation) -> Result<(), StoreError> {
        lock(&self.failures)
            .remove(&operation)
            .map_or(Ok(()), Err)
    }

    fn next_revision(&self) -> String {
        (self.revision.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    fn apply_defaults(&self, object: &ObjectRef, value: &mut Value) {
        if let Some(defaulters) = self.defaulters.get(&object.kind) {
            for defaulter in defaulters {
                defaulter(value);
            }
        }
    }

    async fn insert(&self, mut value: Value) -> Result<Value, StoreError> {
        let object = object_ref_of(&value)?;
        let mut meta = metadata_of(&value)?;
        if meta.resource_version.is_some() {
            return Err(StoreError::Invalid(format!(
                "resourceVersion must not be set when creating {object}"
            )));
        }

        let mut objects = self.objects.write().await;
        if objects.contains_key(&object) {
            return Err(StoreError::AlreadyExists(object));
        }

        self.apply_defaults(&object, &mut value);
        meta.uid = Some(Uuid::new_v4());
        meta.creation_timestamp = Some(Utc::now());
        meta.generation = 1;
        meta.resource_version = Some(self.next_revision());
        set_metadata(&mut value, &meta)?;

        objects.insert(object, value.clone());
        Ok(value)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, _ctx: &Context, object: &ObjectRef) -> Result<Value, StoreError> {
        self.record(StoreOperation::Get, object, None);
        self.injected_failure(StoreOperation::Get)?;

        self.objects
            .read()
            .await
            .get(object)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }

    async fn create(&self, _ctx: &Context, object: Value) -> Result<Value, StoreError> {
        let target = object_ref_of(&object)?;
        self.record(StoreOperation::Create, &target, Some(&object));
        self.injected_failure(StoreOperation::Create)?;

        self.insert(object).await
    }

    async fn update(&self, _ctx: &Context, object: Value, dry_run: bool) -> Result<Value, StoreError> {
        let target = object_ref_of(&object)?;
        let operation = if dry_run {
            StoreOperation::DryRunUpdate
        } else {
            StoreOperation::Update
        };
        self.record(operation, &target, Some(&object));
        self.injected_failure(operation)?;

        let mut objects = self.objects.write().await;
        let current = objects
            .get(&target)
            .ok_or_else(|| StoreError::NotFound(target.clone()))?;
        let current_meta = metadata_of(current)?;
        let current_version = current_meta.resource_version.clone().unwrap_or_default();

        let mut meta = metadata_of(&object)?;
        if let Some(expected) = &meta.resource_version {
            if *expected != current_version {
                return Err(StoreError::Conflict {
                    object: target,
                    expected: expected.clone(),
                    actual: current_version,
                });
            }
        }

        let mut next = object;
        self.apply_defaults(&target, &mut next);

        meta.uid = current_meta.uid;
        meta.creation_timestamp = current_meta.creation_timestamp;
        meta.generation = if content_of(&next) == content_of(current) {
            current_meta.generation
        } else {
            current_meta.generation + 1
        };
        meta.resource_version = Some(current_version);
        set_metadata(&mut next, &meta)?;

        if dry_run || next == *current {
            return Ok(next);
        }

        meta.resource_version = Some(self.next_revision());
        set_metadata(&mut next, &meta)?;
        objects.insert(target, next.clone());
        Ok(next)
    }

    async fn delete(&self, _ctx: &Context, object: &ObjectRef) -> Result<(), StoreError> {
        self.record(StoreOperation::Delete, object, None);
        self.injected_failure(StoreOperation::Delete)?;

        self.objects
            .write()
            .await
            .remove(object)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(object.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_metadata(value: &mut Value, meta: &ObjectMeta) -> Result<(), StoreError> {
    let map = value
        .as_object_mut()
        .ok_or_else(|| StoreError::Invalid("object is not a map".to_string()))?;
    map.insert("metadata".into(), serde_json::to_value(meta)?);
    Ok(())
}

/// The part of an object that drives its generation: everything except
/// metadata and status.
fn content_of(value: &Value) -> Value {
    let mut content = value.clone();
    if let Some(map) = content.as_object_mut() {
        map.remove("metadata");
        map.remove("status");
    }
    content
}
