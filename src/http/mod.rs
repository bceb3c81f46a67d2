//! HTTP server module for service-beacon
//!
//! This module provides the HTTP API server functionality including:
//! - Axum-based web server with routing
//! - Demo route handlers advertised in the service contract
//! - Middleware for tracing, timeouts, and request counting
//! - Graceful shutdown driving the registry lifecycle
//!
//! The server exposes the following endpoints:
//! - GET, POST / - Demo endpoint
//! - ANY /a, ANY /a/bc - Demo endpoints accepting every method
//! - ANY /api/{id} - Demo endpoint, numeric ids only
//! - GET /health - Health check endpoint
//! - GET /metrics - Prometheus metrics (when enabled)

pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod server;

pub use server::start_server;
