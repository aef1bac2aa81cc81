//! Implementation of the `maestro config` commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print the effective configuration after all sources are merged
    Show,
}

#[derive(Debug, serde::Serialize)]
pub struct ConfigOutput {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    rendered: String,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        self.rendered.clone()
    }
}

pub fn execute(args: &ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let rendered =
                serde_yaml::to_string(config).context("Failed to render configuration")?;
            output(
                &ConfigOutput {
                    config: config.clone(),
                    rendered,
                },
                json_mode,
            );
        }
    }
    Ok(())
}
