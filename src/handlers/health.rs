//! Health check and welcome endpoints for the SmartBank backend API.
//!
//! Provides a simple endpoint to verify service liveness for monitoring and orchestration.

use actix_web::{HttpResponse, Responder};

/// Returns the API welcome message.
///
/// # Example
/// ```json
/// { "message": "Welcome to SmartBank API" }
/// ```
#[tracing::instrument]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"message": "Welcome to SmartBank API"}))
}

/// Returns a JSON response indicating the API is healthy.
///
/// # Example
/// ```json
/// { "status": "ok" }
/// ```
/// Adds tracing instrumentation and logs health check requests.
#[tracing::instrument]
pub async fn health_check() -> impl Responder {
    tracing::info!("Health check endpoint called");
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}
