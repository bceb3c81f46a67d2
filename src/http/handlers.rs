//! HTTP endpoint handlers
//!
//! The demo routes echo the request back so the registered instances can be
//! exercised end to end; [`route_table`] lists the same routes for the
//! service contract.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use std::{sync::Arc, time::SystemTime};
use tracing::{debug, warn};

use crate::contract::RouteInfo;
use crate::http::responses::*;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub service_name: String,
    pub addresses: Vec<String>,
    pub port: u16,
    pub start_time: SystemTime,
}

/// Routes served by the demo endpoints, in registration order
pub fn route_table() -> Vec<RouteInfo> {
    vec![
        RouteInfo::new("/", &["GET", "POST"]),
        RouteInfo::any_method("/a"),
        RouteInfo::any_method("/a/bc"),
        RouteInfo::any_method("/api/{id}"),
    ]
}

/// GET, POST / and ANY /a, /a/bc
pub async fn handle_main(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Json<EchoResponse> {
    debug!(method = %method, path = %uri.path(), "Handling demo request");
    Json(EchoResponse {
        service: state.service_name.clone(),
        method: method.to_string(),
        path: uri.path().to_string(),
        id: None,
    })
}

/// ANY /api/{id} - only decimal ids are routed
pub async fn handle_api(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    Path(id): Path<String>,
) -> Response {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return handle_not_found().await.into_response();
    }

    Json(EchoResponse {
        service: state.service_name.clone(),
        method: method.to_string(),
        path: uri.path().to_string(),
        id: Some(id),
    })
    .into_response()
}

/// GET /health - Health check endpoint
pub async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = SystemTime::now()
        .duration_since(state.start_time)
        .unwrap_or_default();

    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.as_secs(),
        port: state.port,
        addresses: state.addresses.clone(),
    })
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn handle_metrics() -> Result<impl IntoResponse, StatusCode> {
    match crate::metrics::gather_metrics() {
        Ok(metrics_text) => Ok((
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            metrics_text,
        )),
        Err(e) => {
            warn!(error = %e, "Failed to gather Prometheus metrics");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Fallback handler for 404 Not Found
pub async fn handle_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found()))
}
