//! Prometheus metrics for registration, metadata reporting and HTTP traffic
//!
//! Metrics live in a process-wide registry exposed on the metrics endpoint.

use lazy_static::lazy_static;
use prometheus::{
    opts, register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge,
    Registry, TextEncoder,
};
use std::sync::Once;
use tracing::debug;

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref REGISTRY: Registry = Registry::new();

    /// Naming registry calls by operation and outcome
    /// Labels: operation (register, update, deregister, beat), outcome (success, failure)
    pub static ref REGISTRY_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("registry_operations_total", "Total number of naming registry operations"),
        &["operation", "outcome"]
    )
    .expect("Failed to create registry_operations_total metric");

    /// Metadata reports by outcome
    pub static ref METADATA_REPORTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("metadata_reports_total", "Total number of service contract reports"),
        &["outcome"]
    )
    .expect("Failed to create metadata_reports_total metric");

    /// Number of addresses advertised at startup
    pub static ref ADVERTISED_ADDRESSES: IntGauge = register_int_gauge!(
        opts!("advertised_addresses", "Addresses advertised to the naming registry")
    )
    .expect("Failed to create advertised_addresses metric");

    /// Total number of HTTP requests
    /// Labels: method, path
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        opts!("http_requests_total", "Total number of HTTP requests"),
        &["method", "path"]
    )
    .expect("Failed to create http_requests_total metric");
}

static INIT: Once = Once::new();

/// Initialize metrics registry by registering all metrics
pub fn init_metrics() {
    INIT.call_once(|| {
        REGISTRY
            .register(Box::new(REGISTRY_OPERATIONS_TOTAL.clone()))
            .expect("Failed to register registry_operations_total");
        REGISTRY
            .register(Box::new(METADATA_REPORTS_TOTAL.clone()))
            .expect("Failed to register metadata_reports_total");
        REGISTRY
            .register(Box::new(ADVERTISED_ADDRESSES.clone()))
            .expect("Failed to register advertised_addresses");
        REGISTRY
            .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
            .expect("Failed to register http_requests_total");

        debug!("Prometheus metrics registry initialized");
    });
}

fn outcome_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record one naming registry call
pub fn record_registry_operation(operation: &str, success: bool) {
    REGISTRY_OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome_label(success)])
        .inc();
}

/// Record one metadata report attempt
pub fn record_metadata_report(success: bool) {
    METADATA_REPORTS_TOTAL
        .with_label_values(&[outcome_label(success)])
        .inc();
}

pub fn set_advertised_addresses(count: usize) {
    ADVERTISED_ADDRESSES.set(count as i64);
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str) {
    HTTP_REQUESTS_TOTAL.with_label_values(&[method, path]).inc();
}

/// Gather all metrics and encode them in Prometheus text format
pub fn gather_metrics() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;

    String::from_utf8(buffer).map_err(|e| format!("Failed to convert metrics to UTF-8: {}", e))
}
