//! Structural comparison over JSON values.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::domain::models::FieldPath;
use crate::domain::ports::StructuralComparator;

/// Compares wire objects field by field.
///
/// Excluded subtrees are removed from both sides first. Object entries whose
/// value is `null` count as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComparator;

impl JsonComparator {
    pub const fn new() -> Self {
        Self
    }
}

impl StructuralComparator for JsonComparator {
    fn equal(&self, a: &Value, b: &Value, exclusions: &[FieldPath]) -> bool {
        prune(a, exclusions) == prune(b, exclusions)
    }

    fn diff(&self, a: &Value, b: &Value, exclusions: &[FieldPath]) -> String {
        let mut out = String::new();
        let mut path = Vec::new();
        diff_into(
            &mut out,
            &mut path,
            Some(&prune(a, exclusions)),
            Some(&prune(b, exclusions)),
        );
        out
    }
}

/// Copy of `value` without the excluded subtrees and without `null` entries.
pub fn prune(value: &Value, exclusions: &[FieldPath]) -> Value {
    let mut path = Vec::new();
    prune_at(value, exclusions, &mut path)
}

fn prune_at(value: &Value, exclusions: &[FieldPath], path: &mut Vec<String>) -> Value {
    match value {
        Value::Object(map) => {
            let mut kept = Map::new();
            for (key, child) in map {
                if child.is_null() {
                    continue;
                }
                path.push(key.clone());
                if !is_excluded(exclusions, path) {
                    kept.insert(key.clone(), prune_at(child, exclusions, path));
                }
                path.pop();
            }
            Value::Object(kept)
        }
        Value::Array(items) => {
            let mut kept = Vec::with_capacity(items.len());
            for (index, child) in items.iter().enumerate() {
                path.push(index.to_string());
                kept.push(prune_at(child, exclusions, path));
                path.pop();
            }
            Value::Array(kept)
        }
        other => other.clone(),
    }
}

fn is_excluded(exclusions: &[FieldPath], path: &[String]) -> bool {
    let segments: Vec<&str> = path.iter().map(String::as_str).collect();
    exclusions.iter().any(|e| e.covers(&segments))
}

fn diff_into(out: &mut String, path: &mut Vec<String>, a: Option<&Value>, b: Option<&Value>) {
    match (a, b) {
        (Some(Value::Object(left)), Some(Value::Object(right))) => {
            let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
            for key in keys {
                path.push(key.clone());
                diff_into(out, path, left.get(key), right.get(key));
                path.pop();
            }
        }
        (Some(Value::Array(left)), Some(Value::Array(right))) => {
            for index in 0..left.len().max(right.len()) {
                path.push(index.to_string());
                diff_into(out, path, left.get(index), right.get(index));
                path.pop();
            }
        }
        (Some(left), Some(right)) if left == right => {}
        (left, right) => {
            let at = if path.is_empty() {
                "<root>".to_string()
            } else {
                path.join(".")
            };
            if let Some(left) = left {
                let _ = writeln!(out, "- {at}: {left}");
            }
            if let Some(right) = right {
                let _ = writeln!(out, "+ {at}: {right}");
            }
        }
    }
}
