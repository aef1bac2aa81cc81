pub mod reconciler;

pub use reconciler::{SimpleReconciler, SimpleReconcilerBuilder};
