use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure for Maestro
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults applied to reconcilers built with `with_defaults`
    #[serde(default)]
    pub reconciler: ReconcilerDefaults,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation of file logs: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// How a reconciler double-checks an apparent change before updating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DryRunPolicy {
    /// Dry-run on mismatch and log the diff when the dry-run shows no change
    #[default]
    Warn,
    /// Dry-run on mismatch without logging
    Silent,
    /// Never dry-run; update whenever the objects differ
    None,
}

impl fmt::Display for DryRunPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Warn => "warn",
            Self::Silent => "silent",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Reconciler defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconcilerDefaults {
    /// Dry-run policy for reconcilers that do not set one
    #[serde(default)]
    pub dry_run: DryRunPolicy,

    /// Whether reconcilers stamp an owner reference on their child
    #[serde(default = "default_true")]
    pub set_owner_reference: bool,

    /// Extra dotted field paths excluded from comparison
    #[serde(default)]
    pub compare_exclusions: Vec<String>,
}

const fn default_true() -> bool {
    true
}

impl Default for ReconcilerDefaults {
    fn default() -> Self {
        Self {
            dry_run: DryRunPolicy::default(),
            set_owner_reference: true,
            compare_exclusions: Vec::new(),
        }
    }
}
