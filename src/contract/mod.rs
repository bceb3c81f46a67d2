//! Service contract reporting
//!
//! Builds the service contract from the HTTP route table and submits it to
//! the OpenSergo metadata service once at startup.

pub mod bootstrap;
pub mod proto;
mod reporter;

use async_trait::async_trait;
use std::collections::HashSet;

use crate::types::Result;
use proto::{
    MethodDescriptor, ReportMetadataRequest, ServiceContract, ServiceDescriptor, ServiceMetadata,
    SocketAddress,
};

pub use reporter::OpenSergoReporter;

/// Methods advertised for a route that accepts any method
pub const ALL_METHODS: [&str; 16] = [
    "GET",
    "POST",
    "PUT",
    "DELETE",
    "PATCH",
    "OPTIONS",
    "HEAD",
    "TRACE",
    "CONNECT",
    "MKCOL",
    "COPY",
    "MOVE",
    "PROPFIND",
    "PROPPATCH",
    "LOCK",
    "UNLOCK",
];

/// A route pattern and the methods it accepts; no methods means all of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub pattern: String,
    pub methods: Vec<String>,
}

impl RouteInfo {
    pub fn new(pattern: &str, methods: &[&str]) -> Self {
        Self {
            pattern: pattern.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn any_method(pattern: &str) -> Self {
        Self::new(pattern, &[])
    }
}

/// Submits a service contract to the metadata service
#[async_trait]
pub trait MetadataReporter: Send + Sync {
    async fn report(&self, request: ReportMetadataRequest) -> Result<()>;
}

/// Describe the routes as one service; methods with an identical name are
/// emitted once.
pub fn build_service_descriptor(routes: &[RouteInfo]) -> ServiceDescriptor {
    let mut seen = HashSet::new();
    let mut methods = Vec::new();

    for route in routes {
        let (label, http_methods) = if route.methods.is_empty() {
            (
                "ALL".to_string(),
                ALL_METHODS.iter().map(|m| m.to_string()).collect::<Vec<_>>(),
            )
        } else {
            (route.methods.join(","), route.methods.clone())
        };

        let name = format!("{} {}", label, route.pattern);
        if seen.insert(name.clone()) {
            methods.push(MethodDescriptor {
                name,
                http_paths: vec![route.pattern.clone()],
                http_methods,
            });
        }
    }

    ServiceDescriptor {
        name: String::new(),
        methods,
    }
}

/// Assemble the report for this process
pub fn build_report_request(
    app_name: &str,
    addresses: &[String],
    port: u16,
    protocols: &[String],
    routes: &[RouteInfo],
) -> ReportMetadataRequest {
    let listening_addresses = addresses
        .iter()
        .map(|ip| SocketAddress {
            address: ip.clone(),
            port_value: u32::from(port),
        })
        .collect();

    ReportMetadataRequest {
        app_name: app_name.to_string(),
        service_metadata: vec![ServiceMetadata {
            listening_addresses,
            protocols: protocols.to_vec(),
            service_contract: Some(ServiceContract {
                services: vec![build_service_descriptor(routes)],
            }),
        }],
    }
}
