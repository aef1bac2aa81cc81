//! Dotted paths naming subtrees of an object, used to exclude fields from
//! structural comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A path such as `metadata.annotations` or `status`.
///
/// A path covers the node it names and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse a dotted path. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, InvalidFieldPath> {
        if path.trim().is_empty() {
            return Err(InvalidFieldPath(path.to_string()));
        }
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(InvalidFieldPath(path.to_string()));
        }
        Ok(Self(segments))
    }

    /// Build a path from literal segments, none of which may be empty.
    pub fn from_segments(segments: &[&str]) -> Self {
        debug_assert!(!segments.is_empty() && segments.iter().all(|s| !s.is_empty()));
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `path` lies at or below this path.
    pub fn covers(&self, path: &[&str]) -> bool {
        path.len() >= self.0.len() && self.0.iter().zip(path).all(|(a, b)| a == b)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = InvalidFieldPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = InvalidFieldPath;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

/// A field path string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field path: {0:?}")]
pub struct InvalidFieldPath(pub String);
