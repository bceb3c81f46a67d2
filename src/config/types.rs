use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::types::{ConfigError, Result};

/// Environment variable holding the naming server host
pub const ENV_SERVER_ADDR: &str = "serverAddr";

/// System configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SystemConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
}

/// Subnet filters applied to host addresses before registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_ignore_nets")]
    pub ignore_nets: Vec<String>,
    #[serde(default)]
    pub allow_nets: Vec<String>,
}

/// Naming registry connection and instance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_server_addr")]
    pub server_addr: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default)]
    pub namespace_id: String,
    #[serde(default = "default_group_name")]
    pub group_name: String,
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_true")]
    pub ephemeral: bool,
    /// Seconds between heartbeats for ephemeral instances
    #[serde(default = "default_beat_interval")]
    pub beat_interval: u64,
    /// Seconds to keep serving after deregistration
    #[serde(default = "default_grace_period")]
    pub grace_period: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    #[serde(default = "default_protocols")]
    pub protocols: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl SystemConfig {
    /// Load system configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::FileNotFound { path: path_str })?;

        let config: SystemConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Load from file, falling back to defaults when the file does not exist.
    ///
    /// Parse errors are still returned.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment overrides using the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_SERVER_ADDR).filter(|v| !v.trim().is_empty()) {
            self.discovery.server_addr = addr.trim().to_string();
        }
    }
}

impl DiscoveryConfig {
    /// Base URL of the naming server, e.g. `http://127.0.0.1:8848`
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.server_addr, self.server_port)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period)
    }

    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs(self.beat_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ignore_nets: default_ignore_nets(),
            allow_nets: Vec::new(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            server_addr: default_server_addr(),
            server_port: default_server_port(),
            scheme: default_scheme(),
            namespace_id: String::new(),
            group_name: default_group_name(),
            cluster_name: default_cluster_name(),
            timeout_ms: default_timeout_ms(),
            weight: default_weight(),
            ephemeral: true,
            beat_interval: default_beat_interval(),
            grace_period: default_grace_period(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            connect_timeout: default_connect_timeout(),
            protocols: default_protocols(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_path: default_metrics_path(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_service_name() -> String {
    "example-beego-opensergo".to_string()
}

fn default_ignore_nets() -> Vec<String> {
    vec!["30.39.179.16/30".to_string(), "fe80::1/24".to_string()]
}

fn default_server_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8848
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_group_name() -> String {
    "DEFAULT_GROUP".to_string()
}

fn default_cluster_name() -> String {
    "DEFAULT".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_weight() -> f64 {
    100.0
}

fn default_beat_interval() -> u64 {
    5
}

fn default_grace_period() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_protocols() -> Vec<String> {
    vec!["http".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}
