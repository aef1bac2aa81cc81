use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{BinderError, Context, ContextKey};

type KeyFn = Arc<dyn Fn() -> String + Send + Sync>;

/// A context slot whose key is computed at runtime.
///
/// The key function runs on every bind, unbind and lookup, which lets several
/// independent slots of the same type coexist (one per child object, say).
/// Two bindings of different types that produce the same key share a slot; a
/// lookup through the wrong one fails with [`BinderError::TypeMismatch`].
pub struct DynamicBinding<T> {
    key_fn: KeyFn,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> DynamicBinding<T> {
    /// Create a binding whose key is produced by `key_fn`.
    pub fn new<F>(key_fn: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            key_fn: Arc::new(key_fn),
            _marker: PhantomData,
        }
    }

    /// Create a binding with a fixed key.
    pub fn with_key(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(move || key.clone())
    }

    /// Key this binding currently resolves to.
    pub fn key(&self) -> ContextKey {
        ContextKey::Named((self.key_fn)())
    }

    /// Attach `value` to a context derived from `ctx`.
    pub fn bind(&self, ctx: &Context, value: Arc<T>) -> Result<Context, BinderError> {
        let key = self.key();
        if ctx.contains(&key) {
            return Err(BinderError::AlreadyBound(key));
        }
        Ok(ctx.with_value(key, value))
    }

    /// Derive a context in which the slot is empty.
    pub fn unbind(&self, ctx: &Context) -> Context {
        ctx.without_value(self.key())
    }

    /// Fetch the bound value.
    pub fn from_context(&self, ctx: &Context) -> Result<Arc<T>, BinderError> {
        let key = self.key();
        let value = ctx
            .value(&key)
            .ok_or_else(|| BinderError::NotFound(key.clone()))?;
        value.downcast::<T>().map_err(|_| BinderError::TypeMismatch {
            key,
            expected: std::any::type_name::<T>(),
        })
    }
}

impl<T> Clone for DynamicBinding<T> {
    fn clone(&self) -> Self {
        Self {
            key_fn: Arc::clone(&self.key_fn),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DynamicBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicBinding")
            .field("key", &(self.key_fn)())
            .finish()
    }
}
