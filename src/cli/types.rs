//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::config::ConfigArgs;
use super::commands::demo::DemoArgs;

#[derive(Parser, Debug)]
#[command(name = "maestro")]
#[command(about = "Maestro - ordered reconciliation of child objects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of maestro.yaml
    #[arg(short, long, global = true, env = "MAESTRO_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converge a sample parent against an in-memory store
    Demo(DemoArgs),

    /// Configuration commands
    Config(ConfigArgs),
}
