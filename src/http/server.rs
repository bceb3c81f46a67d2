//! HTTP server setup and configuration
//!
//! This module provides the main server startup logic, routing configuration,
//! and graceful shutdown handling. The registry lifecycle is driven from here:
//! startup hooks run once the listener is bound, shutdown hooks run before
//! the server stops accepting connections.

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::{any, get},
    Router,
};
use std::{net::SocketAddr, sync::Arc, time::Duration, time::SystemTime};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, instrument, warn};

use crate::{
    config::SystemConfig,
    http::{
        handlers::*,
        middleware::{count_requests, RequestSpan},
    },
    lifecycle::Lifecycle,
    types::Result,
};

/// Start the HTTP server with the given configuration
#[instrument(skip_all)]
pub async fn start_server(
    system_config: SystemConfig,
    lifecycle: Arc<Lifecycle>,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app_state = Arc::new(AppState {
        service_name: lifecycle.service_name().to_string(),
        addresses: lifecycle.addresses().to_vec(),
        port: lifecycle.port(),
        start_time: SystemTime::now(),
    });

    let router = create_router(app_state, &system_config);
    let addr = parse_listen_address(&system_config.server.listen)?;

    info!(
        listen_addr = %addr,
        request_timeout = system_config.server.request_timeout,
        "Starting HTTP server"
    );

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!(
            error = %e,
            addr = %addr,
            "Failed to bind to address"
        );
        crate::types::Error::Io(e)
    })?;

    info!(
        local_addr = %listener.local_addr().unwrap_or(addr),
        "HTTP server listening"
    );

    let startup = {
        let lifecycle = lifecycle.clone();
        tokio::spawn(async move {
            lifecycle.after_start(&route_table()).await;
        })
    };

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        shutdown_signal.await;
        info!("Shutdown signal received, starting graceful shutdown");

        // Registration must finish before it can be undone
        if let Err(e) = startup.await {
            warn!(error = %e, "Startup hooks did not complete");
        }
        lifecycle.before_shutdown().await;
    });

    if let Err(e) = server.await {
        error!(error = %e, "HTTP server error");
        return Err(crate::types::Error::Io(e));
    }

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Create the Axum router with all endpoints and middleware
fn create_router(app_state: Arc<AppState>, config: &SystemConfig) -> Router {
    let demo_routes = Router::new()
        .route("/", get(handle_main).post(handle_main))
        .route("/a", any(handle_main))
        .route("/a/bc", any(handle_main))
        .route("/api/{id}", any(handle_api));

    let health_routes = Router::new().route("/health", get(handle_health));

    let health_routes = if config.monitoring.metrics_enabled {
        health_routes.route(&config.monitoring.metrics_path, get(handle_metrics))
    } else {
        health_routes
    };

    with_middleware(Router::new().merge(demo_routes).merge(health_routes), config)
        .with_state(app_state)
}

/// Request counting, 404 fallback, tracing and request timeout
fn with_middleware(
    routes: Router<Arc<AppState>>,
    config: &SystemConfig,
) -> Router<Arc<AppState>> {
    routes
        .route_layer(from_fn(count_requests))
        .fallback(handle_not_found)
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout),
        ))
}

/// Parse the listen address from configuration
pub fn parse_listen_address(listen: &str) -> Result<SocketAddr> {
    listen.parse().map_err(|e| {
        error!(
            listen_addr = %listen,
            error = %e,
            "Invalid listen address format"
        );
        crate::types::Error::Config(crate::types::ConfigError::Invalid {
            message: format!("Invalid listen address '{}': {}", listen, e),
        })
    })
}
