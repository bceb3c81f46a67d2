use async_trait::async_trait;
use std::time::Duration;
use tonic::transport::Endpoint;
use tracing::{debug, info};

use super::bootstrap;
use super::proto::metadata_service_client::MetadataServiceClient;
use super::proto::ReportMetadataRequest;
use super::MetadataReporter;
use crate::config::MetadataConfig;
use crate::types::{ReportError, Result};

/// Default request timeout for the report call
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Reports the service contract to an OpenSergo control plane over gRPC
#[derive(Debug, Clone)]
pub struct OpenSergoReporter {
    /// Fixed endpoint; `None` resolves from the bootstrap environment at report time
    endpoint: Option<String>,
    connect_timeout: Duration,
}

impl OpenSergoReporter {
    /// Reporter whose endpoint comes from the bootstrap environment variables
    pub fn from_env(config: &MetadataConfig) -> Self {
        Self {
            endpoint: None,
            connect_timeout: Duration::from_secs(config.connect_timeout),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(endpoint: impl Into<String>, config: &MetadataConfig) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            connect_timeout: Duration::from_secs(config.connect_timeout),
        }
    }

    fn endpoint(&self) -> std::result::Result<String, ReportError> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => bootstrap::endpoint_from_env(),
        }
    }
}

#[async_trait]
impl MetadataReporter for OpenSergoReporter {
    async fn report(&self, request: ReportMetadataRequest) -> Result<()> {
        let endpoint = self.endpoint()?;
        debug!(endpoint = %endpoint, "Connecting to metadata service");

        let channel = Endpoint::from_shared(endpoint.clone())
            .map_err(|e| ReportError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?
            .connect_timeout(self.connect_timeout)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .connect()
            .await
            .map_err(|source| ReportError::Connect {
                endpoint: endpoint.clone(),
                source,
            })?;

        let methods = request
            .service_metadata
            .iter()
            .filter_map(|m| m.service_contract.as_ref())
            .flat_map(|c| c.services.iter())
            .map(|s| s.methods.len())
            .sum::<usize>();

        let mut client = MetadataServiceClient::new(channel);
        client
            .report_metadata(request)
            .await
            .map_err(ReportError::Rpc)?;

        info!(endpoint = %endpoint, methods, "Service contract reported");
        Ok(())
    }
}
