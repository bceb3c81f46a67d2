//! Startup and shutdown hooks
//!
//! [`Lifecycle`] is built once with its collaborators and handed to the
//! HTTP server. After the listener is bound it reports the service contract
//! and registers one instance per advertised address; on shutdown it drains
//! and deregisters those instances and then waits out the grace period.
//! Registry and reporting failures are logged, never returned.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn, Instrument};

use crate::config::{DiscoveryConfig, SystemConfig};
use crate::contract::{build_report_request, MetadataReporter, RouteInfo};
use crate::discovery::{Instance, Registry};
use crate::tasks::{spawn_heartbeat_task, HeartbeatConfig};
use crate::types::{ErrorSet, Result};

pub struct Lifecycle {
    service_name: String,
    addresses: Vec<String>,
    port: u16,
    protocols: Vec<String>,
    discovery: DiscoveryConfig,
    registry: Option<Arc<dyn Registry>>,
    reporter: Option<Arc<dyn MetadataReporter>>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl Lifecycle {
    pub fn new(
        config: &SystemConfig,
        addresses: Vec<String>,
        port: u16,
        registry: Option<Arc<dyn Registry>>,
        reporter: Option<Arc<dyn MetadataReporter>>,
    ) -> Self {
        Self {
            service_name: config.service.name.clone(),
            addresses,
            port,
            protocols: config.metadata.protocols.clone(),
            discovery: config.discovery.clone(),
            registry,
            reporter,
            heartbeat: Mutex::new(None),
        }
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn grace_period(&self) -> Duration {
        self.discovery.grace_period()
    }

    fn instances(&self) -> Vec<Instance> {
        self.addresses
            .iter()
            .map(|ip| Instance::serving(&self.service_name, ip, self.port, &self.discovery))
            .collect()
    }

    /// Report the contract, register every address and start heartbeats
    #[instrument(skip_all, fields(service = %self.service_name, port = self.port))]
    pub async fn after_start(&self, routes: &[RouteInfo]) {
        info!(
            pid = std::process::id(),
            ips = ?self.addresses,
            "Service started"
        );
        crate::metrics::set_advertised_addresses(self.addresses.len());

        if let Some(reporter) = &self.reporter {
            let request = build_report_request(
                &self.service_name,
                &self.addresses,
                self.port,
                &self.protocols,
                routes,
            );
            match reporter.report(request).await {
                Ok(()) => crate::metrics::record_metadata_report(true),
                Err(e) => {
                    crate::metrics::record_metadata_report(false);
                    warn!(error = %e, "Failed to report service contract");
                }
            }
        }

        let Some(registry) = &self.registry else {
            return;
        };

        let instances = self.instances();
        let errors = run_for_each(registry.as_ref(), Operation::Register, &instances).await;
        log_phase(Operation::Register, instances.len(), errors);

        if self.discovery.ephemeral && !instances.is_empty() {
            let handle = spawn_heartbeat_task(
                registry.clone(),
                instances,
                HeartbeatConfig {
                    interval: self.discovery.beat_interval(),
                },
            );
            if let Some(previous) = self.heartbeat.lock().replace(handle) {
                previous.abort();
            }
        }
    }

    /// Stop heartbeats, drain, deregister, then wait out the grace period
    #[instrument(skip_all, fields(service = %self.service_name, port = self.port))]
    pub async fn before_shutdown(&self) {
        let heartbeat = self.heartbeat.lock().take();
        if let Some(handle) = heartbeat {
            handle.abort();
        }

        if let Some(registry) = &self.registry {
            let instances = self.instances();

            let draining: Vec<Instance> = instances.iter().map(Instance::draining).collect();
            let errors = run_for_each(registry.as_ref(), Operation::Update, &draining).await;
            log_phase(Operation::Update, draining.len(), errors);

            let errors = run_for_each(registry.as_ref(), Operation::Deregister, &instances).await;
            log_phase(Operation::Deregister, instances.len(), errors);
        }

        let grace = self.grace_period();
        if !grace.is_zero() {
            info!(grace_period_secs = grace.as_secs(), "Waiting before exit");
            tokio::time::sleep(grace).await;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Register,
    Update,
    Deregister,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Register => "register",
            Operation::Update => "update",
            Operation::Deregister => "deregister",
        }
    }
}

/// Apply one registry operation to every instance, collecting all failures
async fn run_for_each(
    registry: &dyn Registry,
    operation: Operation,
    instances: &[Instance],
) -> ErrorSet {
    let mut errors = ErrorSet::new();
    for instance in instances {
        let span = crate::logging::instance_span(&instance.ip, instance.port);
        let result: Result<()> = match operation {
            Operation::Register => registry.register_instance(instance).instrument(span).await,
            Operation::Update => registry.update_instance(instance).instrument(span).await,
            Operation::Deregister => registry.deregister_instance(instance).instrument(span).await,
        };
        crate::metrics::record_registry_operation(operation.as_str(), result.is_ok());
        errors.append(result);
    }
    errors
}

fn log_phase(operation: Operation, count: usize, errors: ErrorSet) {
    let operation = operation.as_str();
    match errors.into_result() {
        Ok(()) => info!(operation, instances = count, "Registry operation completed"),
        Err(errors) => error!(
            operation,
            instances = count,
            failed = errors.len(),
            errors = %errors,
            "Registry operation failed"
        ),
    }
}
