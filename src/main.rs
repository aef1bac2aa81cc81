//! Maestro CLI entry point.

use anyhow::Result;
use clap::Parser;

use maestro::cli::{Cli, Commands};
use maestro::domain::models::Config;
use maestro::infrastructure::config::ConfigLoader;
use maestro::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config, cli.json).await {
        maestro::cli::handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<std::path::PathBuf>, json: bool) -> Result<()> {
    let config: Config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let mut log_config = LogConfig::try_from(&config.logging)?;
    // Keep stdout clean for machine-readable output.
    log_config.enable_stdout = !json;
    let _logger = LoggerImpl::init(&log_config)?;

    match command {
        Commands::Demo(args) => {
            maestro::cli::commands::demo::execute(args, &config.reconciler, json).await
        }
        Commands::Config(args) => maestro::cli::commands::config::execute(&args, &config, json),
    }
}
