//! What a reconcile step reports back to its caller.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a successful reconcile.
///
/// A requeue means the step changed something and convergence should run
/// again soon; an idle outcome means nothing further is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub requeue: bool,
    pub requeue_after: Option<Duration>,
}

impl Outcome {
    /// Nothing further to do.
    pub const fn idle() -> Self {
        Self {
            requeue: false,
            requeue_after: None,
        }
    }

    /// Run again promptly.
    pub const fn requeue() -> Self {
        Self {
            requeue: true,
            requeue_after: None,
        }
    }

    /// Run again after `delay`.
    pub const fn requeue_after(delay: Duration) -> Self {
        Self {
            requeue: false,
            requeue_after: Some(delay),
        }
    }

    /// Whether the caller should trigger another pass.
    pub fn needs_requeue(&self) -> bool {
        self.requeue || self.requeue_after.is_some_and(|d| !d.is_zero())
    }
}

/// Name and purpose of a reconcile step, for conditions and logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Descriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
