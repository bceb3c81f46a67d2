//! Naming registry integration
//!
//! The service advertises one [`Instance`] per resolved address. The
//! [`Registry`] trait is the seam between the lifecycle hooks and the
//! registry backend; [`NacosRegistry`] talks to a Nacos server over its
//! HTTP open API.

mod nacos;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::DiscoveryConfig;
use crate::types::Result;

pub use nacos::NacosRegistry;

/// One registered service instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub service_name: String,
    pub group_name: String,
    pub cluster_name: String,
    pub ip: String,
    pub port: u16,
    pub weight: f64,
    pub enabled: bool,
    pub healthy: bool,
    pub ephemeral: bool,
    pub metadata: BTreeMap<String, String>,
}

impl Instance {
    /// Instance advertised while the service is up
    pub fn serving(service_name: &str, ip: &str, port: u16, config: &DiscoveryConfig) -> Self {
        Self {
            service_name: service_name.to_string(),
            group_name: config.group_name.clone(),
            cluster_name: config.cluster_name.clone(),
            ip: ip.to_string(),
            port,
            weight: config.weight,
            enabled: true,
            healthy: true,
            ephemeral: config.ephemeral,
            metadata: BTreeMap::new(),
        }
    }

    /// Same instance with traffic drained: zero weight and disabled
    pub fn draining(&self) -> Self {
        Self {
            weight: 0.0,
            enabled: false,
            ..self.clone()
        }
    }

    /// Service name in the registry's `group@@service` form
    pub fn grouped_service_name(&self) -> String {
        format!("{}@@{}", self.group_name, self.service_name)
    }
}

/// Registry operations used by the lifecycle hooks
#[async_trait]
pub trait Registry: Send + Sync {
    async fn register_instance(&self, instance: &Instance) -> Result<()>;

    async fn update_instance(&self, instance: &Instance) -> Result<()>;

    async fn deregister_instance(&self, instance: &Instance) -> Result<()>;

    /// Keep an ephemeral instance alive
    async fn send_beat(&self, instance: &Instance) -> Result<()>;
}
