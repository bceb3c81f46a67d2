use ipnet::IpNet;
use std::net::SocketAddr;

use super::types::SystemConfig;
use crate::types::{Error, Result};

// Validation helper functions

/// Validate listen address format (host:port)
pub(crate) fn validate_listen_address(addr: &str) -> Result<()> {
    let parsed = addr.parse::<SocketAddr>().map_err(|_| Error::Validation {
        field: "server.listen".to_string(),
        message: format!("Invalid listen address format '{}'. Expected format: 'host:port' (e.g., '0.0.0.0:8080')", addr),
    })?;

    // The listen port is what gets registered, so it has to be known up front
    if parsed.port() == 0 {
        return Err(Error::Validation {
            field: "server.listen".to_string(),
            message: format!("Listen address '{}' must use a fixed port", addr),
        });
    }
    Ok(())
}

/// Validate positive timeout value
pub(crate) fn validate_positive_timeout(value: u64, field: &str) -> Result<()> {
    if value == 0 {
        return Err(Error::Validation {
            field: field.to_string(),
            message: "Timeout must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Validate CIDR notation for a subnet filter entry
pub(crate) fn validate_network_cidr(cidr: &str, field: &str) -> Result<()> {
    cidr.trim()
        .parse::<IpNet>()
        .map_err(|e| Error::Validation {
            field: field.to_string(),
            message: format!(
                "Invalid CIDR notation '{}': {}. Expected format: 'IP/prefix' (e.g., '192.168.1.0/24')",
                cidr, e
            ),
        })?;
    Ok(())
}

/// Validate array size limits
pub(crate) fn validate_array_size<T>(array: &[T], field: &str, max_size: usize) -> Result<()> {
    if array.len() > max_size {
        return Err(Error::Validation {
            field: field.to_string(),
            message: format!(
                "Array size {} exceeds maximum allowed size of {}",
                array.len(),
                max_size
            ),
        });
    }
    Ok(())
}

/// Validate instance weight range
pub(crate) fn validate_weight(weight: f64, field: &str) -> Result<()> {
    if !(0.0..=10000.0).contains(&weight) {
        return Err(Error::Validation {
            field: field.to_string(),
            message: format!("Weight {} must be between 0 and 10000", weight),
        });
    }
    Ok(())
}

/// Validate a non-empty identifier
pub(crate) fn validate_not_empty(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation {
            field: field.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(())
}

impl SystemConfig {
    /// Validate the configuration
    /// Full validation, including CIDR syntax of the subnet filters
    pub async fn validate(&self) -> Result<()> {
        self.validate_startup().await?;
        self.validate_subnet_filters()
    }

    /// Report malformed subnet filter entries.
    ///
    /// Only the `validate` command treats these as errors; at runtime the
    /// resolver drops them with a warning.
    pub fn validate_subnet_filters(&self) -> Result<()> {
        for (i, cidr) in self.network.ignore_nets.iter().enumerate() {
            validate_network_cidr(cidr, &format!("network.ignore_nets[{}]", i))?;
        }
        for (i, cidr) in self.network.allow_nets.iter().enumerate() {
            validate_network_cidr(cidr, &format!("network.allow_nets[{}]", i))?;
        }
        Ok(())
    }

    /// Checks that must pass before the service starts
    pub async fn validate_startup(&self) -> Result<()> {
        // Server
        validate_listen_address(&self.server.listen)?;
        validate_positive_timeout(self.server.request_timeout, "server.request_timeout")?;

        // Service
        validate_not_empty(&self.service.name, "service.name")?;

        // Subnet filters
        validate_array_size(&self.network.ignore_nets, "network.ignore_nets", 100)?;
        validate_array_size(&self.network.allow_nets, "network.allow_nets", 100)?;

        // Discovery
        if self.discovery.enabled {
            validate_not_empty(&self.discovery.server_addr, "discovery.server_addr")?;
            if self.discovery.server_port == 0 {
                return Err(Error::Validation {
                    field: "discovery.server_port".to_string(),
                    message: "Port must be greater than 0".to_string(),
                });
            }
            if !matches!(self.discovery.scheme.as_str(), "http" | "https") {
                return Err(Error::Validation {
                    field: "discovery.scheme".to_string(),
                    message: format!(
                        "Invalid scheme '{}'. Must be one of: http, https",
                        self.discovery.scheme
                    ),
                });
            }
            validate_not_empty(&self.discovery.group_name, "discovery.group_name")?;
            validate_not_empty(&self.discovery.cluster_name, "discovery.cluster_name")?;
            validate_positive_timeout(self.discovery.timeout_ms, "discovery.timeout_ms")?;
            validate_weight(self.discovery.weight, "discovery.weight")?;
            if self.discovery.ephemeral {
                validate_positive_timeout(self.discovery.beat_interval, "discovery.beat_interval")?;
            }
        }

        // Metadata reporting
        if self.metadata.enabled {
            validate_positive_timeout(self.metadata.connect_timeout, "metadata.connect_timeout")?;
            if self.metadata.protocols.is_empty() {
                return Err(Error::Validation {
                    field: "metadata.protocols".to_string(),
                    message: "At least one protocol is required".to_string(),
                });
            }
        }

        // Logging
        if !matches!(
            self.logging.level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(Error::Validation {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                ),
            });
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(Error::Validation {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Must be one of: json, pretty",
                    self.logging.format
                ),
            });
        }

        // Monitoring
        if self.monitoring.metrics_enabled && !self.monitoring.metrics_path.starts_with('/') {
            return Err(Error::Validation {
                field: "monitoring.metrics_path".to_string(),
                message: format!(
                    "Metrics path '{}' must start with '/'",
                    self.monitoring.metrics_path
                ),
            });
        }

        Ok(())
    }
}
