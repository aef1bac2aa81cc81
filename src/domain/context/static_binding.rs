use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{BinderError, Context, ContextKey};

/// A context slot keyed by the type `T` itself.
///
/// Every `StaticBinding<T>` resolves to the same key, so there is exactly one
/// slot per type for the whole process.
pub struct StaticBinding<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> StaticBinding<T> {
    /// Create a binding handle for `T`.
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Key this binding resolves to.
    pub fn key(&self) -> ContextKey {
        ContextKey::of::<T>()
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

impl<T: Any + Send + Sync> Default for StaticBinding<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_bind_and_fetch() {
        let binding = StaticBinding::<Marker>::new();
        let value = Arc::new(Marker(3));

        let ctx = binding.bind(&Context::background(), Arc::clone(&value)).unwrap();
        let fetched = binding.from_context(&ctx).unwrap();

        assert!(Arc::ptr_eq(&value, &fetched));
    }

    #[test]
    fn test_bind_twice_fails() {
        let binding = StaticBinding::<Marker>::new();
        let ctx = binding
            .bind(&Context::background(), Arc::new(Marker(1)))
            .unwrap();

        let err = binding.bind(&ctx, Arc::new(Marker(2))).unwrap_err();
        assert!(matches!(err, BinderError::AlreadyBound(_)));
    }

    #[test]
    fn test_fetch_unbound_fails() {
        let binding = StaticBinding::<Marker>::new();
        let err = binding.from_context(&Context::background()).unwrap_err();
        assert!(matches!(err, BinderError::NotFound(_)));
    }

    #[test]
    fn test_unbind_then_rebind() {
        let binding = StaticBinding::<Marker>::new();
        let ctx = binding
            .bind(&Context::background(), Arc::new(Marker(1)))
            .unwrap();
        let ctx = binding.unbind(&ctx);

        assert!(matches!(
            binding.from_context(&ctx),
            Err(BinderError::NotFound(_))
        ));

        let ctx = binding.bind(&ctx, Arc::new(Marker(2))).unwrap();
        assert_eq!(*binding.from_context(&ctx).unwrap(), Marker(2));
    }

    #[test]
    fn test_distinct_types_use_distinct_slots() {
        let ctx = StaticBinding::<Marker>::new()
            .bind(&Context::background(), Arc::new(Marker(1)))
            .unwrap();
        let ctx = StaticBinding::<String>::new()
            .bind(&ctx, Arc::new("hello".to_string()))
            .unwrap();

        assert_eq!(*StaticBinding::<Marker>::new().from_context(&ctx).unwrap(), Marker(1));
        assert_eq!(
            StaticBinding::<String>::new().from_context(&ctx).unwrap().as_str(),
            "hello"
        );
    }
}
