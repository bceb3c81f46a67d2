//! Logging module for service-beacon
//!
//! This module provides structured logging functionality with support for:
//! - JSON and pretty format output
//! - Configurable log levels via environment or configuration
//! - Service and instance context spans for registry operations
//! - CLI argument integration for logging preferences
//!
//! # Usage
//!
//! Initialize logging early in your application:
//! ```rust,ignore
//! logging::init(Some("debug"), None, Some(&system_config))?;
//! ```
//!
//! Use context helpers for structured logging:
//! ```rust,ignore
//! let _span = logging::service_span("orders").entered();
//! let _span = logging::instance_span("10.0.0.5", 8080).entered();
//! ```

use tracing::{info_span, Span};
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

use crate::config::SystemConfig;
use crate::types::Result;

/// Create a service context span
pub fn service_span(service_name: &str) -> Span {
    info_span!("service", service_name = service_name)
}

/// Create a span for one registered instance
pub fn instance_span(ip: &str, port: u16) -> Span {
    info_span!("instance", ip = ip, port = port)
}

/// Log level enum values as strings for configuration
pub mod level {
    pub const TRACE: &str = "trace";
    pub const DEBUG: &str = "debug";
    pub const INFO: &str = "info";
    pub const WARN: &str = "warn";
    pub const ERROR: &str = "error";
}

/// Log format enum values as strings for configuration
pub mod format {
    pub const JSON: &str = "json";
    pub const PRETTY: &str = "pretty";
}

/// Initialize logging with configuration
///
/// # Precedence
///
/// 1. CLI arguments (highest priority)
/// 2. System configuration file
/// 3. Default values (lowest priority)
///
/// `RUST_LOG` replaces the level filter entirely when set.
pub fn init(
    log_level_override: Option<&str>,
    log_format_override: Option<&str>,
    system_config: Option<&SystemConfig>,
) -> Result<()> {
    let log_level = if let Some(level) = log_level_override {
        level
    } else if let Some(config) = system_config {
        &config.logging.level
    } else {
        level::INFO
    };

    let log_format = if let Some(fmt) = log_format_override {
        fmt
    } else if let Some(config) = system_config {
        &config.logging.format
    } else {
        format::PRETTY
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string());

    let result = match log_format {
        format::JSON => tracing_subscriber::fmt()
            .json()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .with_current_span(true)
            .with_span_list(false)
            .try_init(),
        format::PRETTY => tracing_subscriber::fmt()
            .pretty()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .with_timer(timer)
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init(),
    };

    result.map_err(|e| {
        crate::types::Error::Application(format!("Failed to initialize logging: {}", e))
    })
}
