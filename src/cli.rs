use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, instrument, warn, Instrument};

use crate::config::SystemConfig;
use crate::contract::{MetadataReporter, OpenSergoReporter};
use crate::discovery::{NacosRegistry, Registry};
use crate::lifecycle::Lifecycle;
use crate::types::Result;

#[derive(Parser)]
#[command(name = "service-beacon")]
#[command(about = "An HTTP service that advertises itself to a naming registry")]
#[command(long_about = "
A demo HTTP service that registers every non-loopback host address with a
Nacos naming registry, reports its API contract to an OpenSergo control plane,
and deregisters cleanly on shutdown.
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// System configuration file path (defaults apply when missing)
    #[arg(short, long, default_value = "/etc/service-beacon/config.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run the service (default if no subcommand given)
    Run(RunArgs),
    /// Validate the configuration file
    Validate,
    /// Print the addresses that would be registered, one per line
    Addresses,
    /// Show detailed version and build information
    Version,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
    /// Override listen address (format: "host:port")
    #[arg(long)]
    pub listen: Option<String>,

    /// Set log format
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Get effective log level considering verbose/quiet flags
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            self.log_level.clone().unwrap_or(LogLevel::Info)
        }
    }

    /// Convert LogLevel enum to string for logging module
    pub fn log_level_to_str(&self) -> &'static str {
        match self.effective_log_level() {
            LogLevel::Trace => crate::logging::level::TRACE,
            LogLevel::Debug => crate::logging::level::DEBUG,
            LogLevel::Info => crate::logging::level::INFO,
            LogLevel::Warn => crate::logging::level::WARN,
            LogLevel::Error => crate::logging::level::ERROR,
        }
    }

    /// Level override only when one of the level flags was given
    pub fn log_level_override(&self) -> Option<&'static str> {
        if self.log_level.is_some() || self.verbose || self.quiet {
            Some(self.log_level_to_str())
        } else {
            None
        }
    }

    /// Get log format override from CLI arguments
    pub fn log_format_override(&self) -> Option<&'static str> {
        match &self.command {
            Some(Commands::Run(args)) => args.log_format.as_ref().map(|fmt| match fmt {
                LogFormat::Json => crate::logging::format::JSON,
                LogFormat::Pretty => crate::logging::format::PRETTY,
            }),
            _ => None,
        }
    }
}

/// Run the service until a shutdown signal arrives
pub async fn run_server(cli: &Cli, args: RunArgs, system_config: SystemConfig) -> Result<()> {
    serve_until(cli, args, system_config, setup_shutdown_signal()).await
}

/// Run the service until `shutdown` resolves
///
/// Malformed subnet filter entries are not fatal here; the resolver drops them.
#[instrument(skip_all)]
async fn serve_until(
    cli: &Cli,
    args: RunArgs,
    mut system_config: SystemConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    if let Some(listen) = args.listen {
        system_config.server.listen = listen;
    }
    system_config.validate_startup().await?;

    info!(
        config_path = %cli.config.display(),
        service = %system_config.service.name,
        "Configuration loaded successfully"
    );

    let listen_addr = crate::http::server::parse_listen_address(&system_config.server.listen)?;
    let addresses = crate::network::resolve_host(&system_config.network);

    let registry: Option<Arc<dyn Registry>> = if system_config.discovery.enabled {
        match NacosRegistry::new(&system_config.discovery) {
            Ok(registry) => {
                info!(server = %registry.base_url(), "Naming registry client initialized");
                Some(Arc::new(registry))
            }
            Err(e) => {
                warn!(error = %e, "Naming registry client unavailable, continuing without registration");
                None
            }
        }
    } else {
        info!("Service discovery disabled");
        None
    };

    let reporter: Option<Arc<dyn MetadataReporter>> = if system_config.metadata.enabled {
        Some(Arc::new(OpenSergoReporter::from_env(&system_config.metadata)))
    } else {
        info!("Metadata reporting disabled");
        None
    };

    let span = crate::logging::service_span(&system_config.service.name);
    let lifecycle = Arc::new(Lifecycle::new(
        &system_config,
        addresses,
        listen_addr.port(),
        registry,
        reporter,
    ));

    crate::http::start_server(system_config, lifecycle, shutdown)
        .instrument(span)
        .await
}

/// Validate the configuration file
#[instrument(skip_all)]
pub async fn validate_config(cli: &Cli, config: SystemConfig) -> Result<()> {
    info!("Validating configuration file...");

    if let Err(e) = config.validate().await {
        error!(
            config_path = %cli.config.display(),
            error = %e,
            "System configuration validation failed"
        );
        return Err(e);
    }

    let _service_span = crate::logging::service_span(&config.service.name).entered();
    info!(
        config_path = %cli.config.display(),
        listen = %config.server.listen,
        ignore_nets = config.network.ignore_nets.len(),
        allow_nets = config.network.allow_nets.len(),
        discovery_enabled = config.discovery.enabled,
        registry = %config.discovery.base_url(),
        metadata_enabled = config.metadata.enabled,
        "System configuration is valid"
    );
    Ok(())
}

/// Print the addresses that would be registered
#[instrument(skip_all)]
pub async fn show_addresses(config: SystemConfig) -> Result<()> {
    let addresses = crate::network::resolve_host(&config.network);
    info!(count = addresses.len(), "Resolved advertised addresses");
    for ip in addresses {
        println!("{}", ip);
    }
    Ok(())
}

/// Show version and build information
#[instrument]
pub async fn show_version() -> Result<()> {
    println!("service-beacon {}", env!("CARGO_PKG_VERSION"));
    println!("Description: {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("License: {}", env!("CARGO_PKG_LICENSE"));
    println!();

    println!("Build Information:");
    println!(
        "  Build Profile: {}",
        if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        }
    );
    println!();

    println!("Runtime Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Architecture: {}", std::env::consts::ARCH);

    Ok(())
}

/// Set up graceful shutdown signal handling for Linux
pub async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C");
        },
        _ = terminate => {
            info!("Received SIGTERM");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["service-beacon"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("/etc/service-beacon/config.toml"));
        assert_eq!(cli.effective_log_level(), LogLevel::Info);
        assert!(cli.log_level_override().is_none());
        assert!(cli.log_format_override().is_none());
    }

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "service-beacon",
            "--config",
            "beacon.toml",
            "run",
            "--listen",
            "127.0.0.1:9000",
            "--log-format",
            "pretty",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("beacon.toml"));
        assert_eq!(cli.log_format_override(), Some("pretty"));
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.listen.as_deref(), Some("127.0.0.1:9000"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose_and_quiet() {
        let cli = Cli::try_parse_from(["service-beacon", "-v", "addresses"]).unwrap();
        assert_eq!(cli.log_level_override(), Some("debug"));
        assert!(matches!(cli.command, Some(Commands::Addresses)));

        let cli = Cli::try_parse_from(["service-beacon", "-q", "validate"]).unwrap();
        assert_eq!(cli.log_level_override(), Some("error"));

        assert!(Cli::try_parse_from(["service-beacon", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_explicit_log_level() {
        let cli = Cli::try_parse_from(["service-beacon", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.log_level_override(), Some("warn"));
    }

    #[tokio::test]
    async fn test_validate_config_rejects_bad_cidr() {
        let cli = Cli::try_parse_from(["service-beacon", "validate"]).unwrap();
        let mut config = SystemConfig::default();
        assert!(validate_config(&cli, config.clone()).await.is_ok());

        config.network.allow_nets = vec!["not-a-cidr".to_string()];
        assert!(validate_config(&cli, config).await.is_err());
    }

    #[tokio::test]
    async fn test_run_server_rejects_invalid_listen_override() {
        let cli = Cli::try_parse_from(["service-beacon"]).unwrap();
        let args = RunArgs {
            listen: Some("nonsense".to_string()),
            log_format: None,
        };
        assert!(run_server(&cli, args, SystemConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_serve_until_starts_despite_malformed_cidr() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let cli = Cli::try_parse_from(["service-beacon"]).unwrap();
        let mut config = SystemConfig::default();
        config.network.ignore_nets.push("10.0.0.0/33".to_string());
        config.network.allow_nets = vec!["garbage".to_string()];
        config.discovery.enabled = false;
        config.metadata.enabled = false;
        config.discovery.grace_period = 0;
        let args = RunArgs {
            listen: Some(format!("127.0.0.1:{}", port)),
            log_format: None,
        };

        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(300));
        let connect = async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            tokio::net::TcpStream::connect(("127.0.0.1", port))
                .await
                .is_ok()
        };

        let (served, connected) = tokio::join!(serve_until(&cli, args, config, shutdown), connect);
        assert!(served.is_ok(), "serve_until failed: {:?}", served.err());
        assert!(connected);
    }
}
