use serde_json::Value;

use crate::domain::models::FieldPath;

/// Port for structural equality over wire objects.
pub trait StructuralComparator: Send + Sync {
    /// Whether `a` and `b` are equal once every path in `exclusions` is ignored.
    fn equal(&self, a: &Value, b: &Value, exclusions: &[FieldPath]) -> bool;

    /// Human-readable difference between `a` and `b` under the same exclusions.
    fn diff(&self, a: &Value, b: &Value, exclusions: &[FieldPath]) -> String;
}
