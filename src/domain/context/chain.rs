use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Key a value is stored under in a [`Context`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextKey {
    /// Keyed by the bound value's type.
    Type {
        id: TypeId,
        name: &'static str,
    },
    /// Keyed by a runtime string.
    Named(String),
}

impl ContextKey {
    /// Key for the type `T`.
    pub fn of<T: 'static>() -> Self {
        Self::Type {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Key for a runtime name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { name, .. } => write!(f, "type:{name}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

pub(super) type SharedValue = Arc<dyn Any + Send + Sync>;

struct Node {
    key: ContextKey,
    /// `None` marks the key as unbound from this node down.
    value: Option<SharedValue>,
    parent: Option<Arc<Node>>,
}

/// Immutable, cheaply cloneable propagation context.
///
/// Lookups walk from the newest binding towards the root; the first node whose
/// key matches wins, so a newer binding (or an unbind tombstone) shadows older
/// ones without touching them.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Node>>,
}

impl Context {
    /// The empty root context.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context with `value` attached under `key`.
    pub fn with_value(&self, key: ContextKey, value: SharedValue) -> Self {
        self.push(key, Some(value))
    }

    /// Derive a context in which `key` resolves to nothing.
    pub fn without_value(&self, key: ContextKey) -> Self {
        self.push(key, None)
    }

    /// Resolve `key`, returning the bound value if any.
    pub fn value(&self, key: &ContextKey) -> Option<SharedValue> {
        let mut cursor = self.head.as_ref();
        while let Some(node) = cursor {
            if &node.key == key {
                return node.value.clone();
            }
            cursor = node.parent.as_ref();
        }
        None
    }

    /// Whether `key` currently resolves to a value.
    pub fn contains(&self, key: &ContextKey) -> bool {
        self.value(key).is_some()
    }

    fn push(&self, key: ContextKey, value: Option<SharedValue>) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key,
                value,
                parent: self.head.clone(),
            })),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut cursor = self.head.as_ref();
        while let Some(node) = cursor {
            keys.push(node.key.to_string());
            cursor = node.parent.as_ref();
        }
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}
