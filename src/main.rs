mod cli;
mod config;
mod contract;
mod discovery;
mod http;
mod lifecycle;
mod logging;
mod metrics;
mod network;
mod tasks;
mod types;

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Cli, Commands, RunArgs};
use crate::config::SystemConfig;
use crate::types::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Version needs no configuration; everything else falls back to defaults
    // when the file is missing but fails on a file that does not parse.
    let loaded = match &cli.command {
        Some(Commands::Version) => None,
        _ => Some(SystemConfig::load_or_default(&cli.config).map(|mut config| {
            config.apply_env_overrides();
            config
        })),
    };

    crate::logging::init(
        cli.log_level_override(),
        cli.log_format_override(),
        loaded.as_ref().and_then(|result| result.as_ref().ok()),
    )?;

    crate::metrics::init_metrics();

    let system_config = match loaded {
        Some(Ok(config)) => Some(config),
        Some(Err(e)) => {
            error!(
                config_path = %cli.config.display(),
                error = %e,
                "Failed to load configuration"
            );
            return Err(e);
        }
        None => None,
    };

    info!("Starting service-beacon");

    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    match (command, system_config) {
        (Commands::Version, _) => cli::show_version().await,
        (Commands::Run(args), Some(config)) => cli::run_server(&cli, args, config).await,
        (Commands::Validate, Some(config)) => cli::validate_config(&cli, config).await,
        (Commands::Addresses, Some(config)) => cli::show_addresses(config).await,
        (_, None) => Err(crate::types::Error::Application(
            "Configuration was not loaded".to_string(),
        )),
    }
}
