//! Nacos naming client over the v1 HTTP open API

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{Instance, Registry};
use crate::config::DiscoveryConfig;
use crate::types::{RegistryError, Result};

const INSTANCE_PATH: &str = "/nacos/v1/ns/instance";
const BEAT_PATH: &str = "/nacos/v1/ns/instance/beat";

/// Registry backed by a Nacos server
#[derive(Clone)]
pub struct NacosRegistry {
    client: Client,
    base_url: String,
    namespace_id: String,
    timeout: Duration,
}

impl NacosRegistry {
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        Self::with_base_url(config.base_url(), config)
    }

    /// Build a client for an explicit base URL such as `http://127.0.0.1:8848`
    pub fn with_base_url(base_url: impl Into<String>, config: &DiscoveryConfig) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace_id: config.namespace_id.clone(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn instance_params(&self, instance: &Instance) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("serviceName", instance.service_name.clone()),
            ("groupName", instance.group_name.clone()),
            ("clusterName", instance.cluster_name.clone()),
            ("ip", instance.ip.clone()),
            ("port", instance.port.to_string()),
            ("weight", instance.weight.to_string()),
            ("enabled", instance.enabled.to_string()),
            ("healthy", instance.healthy.to_string()),
            ("ephemeral", instance.ephemeral.to_string()),
        ];
        if !instance.metadata.is_empty() {
            params.push((
                "metadata",
                serde_json::to_string(&instance.metadata).unwrap_or_default(),
            ));
        }
        if !self.namespace_id.is_empty() {
            params.push(("namespaceId", self.namespace_id.clone()));
        }
        params
    }

    fn deregister_params(&self, instance: &Instance) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("serviceName", instance.service_name.clone()),
            ("groupName", instance.group_name.clone()),
            ("clusterName", instance.cluster_name.clone()),
            ("ip", instance.ip.clone()),
            ("port", instance.port.to_string()),
            ("ephemeral", instance.ephemeral.to_string()),
        ];
        if !self.namespace_id.is_empty() {
            params.push(("namespaceId", self.namespace_id.clone()));
        }
        params
    }

    fn beat_params(&self, instance: &Instance) -> Vec<(&'static str, String)> {
        let beat = json!({
            "serviceName": instance.grouped_service_name(),
            "ip": instance.ip,
            "port": instance.port,
            "cluster": instance.cluster_name,
            "weight": instance.weight,
            "metadata": instance.metadata,
            "scheduled": true,
        });
        let mut params = vec![
            ("serviceName", instance.grouped_service_name()),
            ("groupName", instance.group_name.clone()),
            ("ip", instance.ip.clone()),
            ("port", instance.port.to_string()),
            ("clusterName", instance.cluster_name.clone()),
            ("ephemeral", "true".to_string()),
            ("beat", beat.to_string()),
        ];
        if !self.namespace_id.is_empty() {
            params.push(("namespaceId", self.namespace_id.clone()));
        }
        params
    }

    /// Send one request; `expect_ok` requires the literal `ok` body
    async fn call(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        instance: &Instance,
        params: Vec<(&'static str, String)>,
        expect_ok: bool,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(operation, url = %url, ip = %instance.ip, port = instance.port, "Calling naming server");

        let response = self
            .client
            .request(method, &url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("timed out after {}ms", self.timeout.as_millis())
                } else if e.is_connect() {
                    format!("failed to connect to {}: {}", self.base_url, e)
                } else {
                    e.to_string()
                };
                RegistryError::Request {
                    operation,
                    ip: instance.ip.clone(),
                    port: instance.port,
                    message,
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() || (expect_ok && body.trim() != "ok") {
            return Err(RegistryError::Rejected {
                operation,
                ip: instance.ip.clone(),
                port: instance.port,
                status: status.as_u16(),
                body: body.trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl Registry for NacosRegistry {
    async fn register_instance(&self, instance: &Instance) -> Result<()> {
        let params = self.instance_params(instance);
        self.call("register", Method::POST, INSTANCE_PATH, instance, params, true)
            .await
    }

    async fn update_instance(&self, instance: &Instance) -> Result<()> {
        let params = self.instance_params(instance);
        self.call("update", Method::PUT, INSTANCE_PATH, instance, params, true)
            .await
    }

    async fn deregister_instance(&self, instance: &Instance) -> Result<()> {
        let params = self.deregister_params(instance);
        self.call("deregister", Method::DELETE, INSTANCE_PATH, instance, params, true)
            .await
    }

    async fn send_beat(&self, instance: &Instance) -> Result<()> {
        let params = self.beat_params(instance);
        self.call("beat", Method::PUT, BEAT_PATH, instance, params, false)
            .await
    }
}
