//! JSON response bodies returned by the HTTP handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::types::Error;

/// Body returned by the demo routes
#[derive(Debug, Clone, Serialize)]
pub struct EchoResponse {
    pub service: String,
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub port: u16,
    pub addresses: Vec<String>,
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &Error) -> Self {
        Self::with_code(error.to_string(), error_to_code(error))
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found() -> Self {
        Self::with_code("Endpoint not found", "NOT_FOUND")
    }
}

fn error_to_code(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "CONFIG_ERROR",
        Error::Validation { .. } => "VALIDATION_ERROR",
        Error::Registry(_) => "REGISTRY_ERROR",
        Error::Report(_) => "REPORT_ERROR",
        Error::Io(_) => "IO_ERROR",
        Error::Application(_) => "APPLICATION_ERROR",
    }
}

/// Convert error types to HTTP status codes
pub fn error_to_status_code(error: &Error) -> StatusCode {
    match error {
        Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::Registry(_) | Error::Report(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) | Error::Io(_) | Error::Application(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = error_to_status_code(&self);
        (status_code, Json(ErrorResponse::new(&self))).into_response()
    }
}
