//! Library entry point for the SmartBank backend.
//!
//! Exports all core modules for use in integration tests and by the main binary.

pub mod auth_middleware;
pub mod db;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod services;
pub mod telemetry;
pub mod detection {
    pub mod anomaly;
    pub use anomaly::*;
}

pub use auth_middleware::*;
pub use db::*;
pub use detection::*;
pub use middleware::RequestLoggingMiddleware;
pub use models::AppState;
pub use models::*;
pub use services::*;
pub use telemetry::{get_subscriber, init_subscriber};
