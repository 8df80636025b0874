//! Request logging middleware for HTTP request/response tracking.
//!
//! This middleware logs every incoming HTTP request with timing, status code,
//! and request metadata, choosing the log level from the response status.

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
};
use futures::future::{Ready, ok};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};
use uuid::Uuid;

/// Request logging middleware that captures request/response data.
///
/// This middleware automatically logs:
/// - Request method, path, and query parameters
/// - Response status codes and timing
/// - IP addresses and user agents
#[derive(Clone)]
pub struct RequestLoggingMiddleware;

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RequestLoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggingService { service })
    }
}

/// Request logging service implementation.
pub struct RequestLoggingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestLoggingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();
        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            query_string = %query_string,
            remote_addr = %remote_addr,
            user_agent = %user_agent,
            "Incoming request"
        );

        let fut = self.service.call(req);

        Box::pin(async move {
            let response = fut.await?;
            let duration = start_time.elapsed();
            let status_code = response.status().as_u16();

            match status_code {
                200..=399 => tracing::info!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code = status_code,
                    duration_ms = duration.as_millis() as u64,
                    remote_addr = %remote_addr,
                    "Request completed"
                ),
                400..=499 => tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code = status_code,
                    duration_ms = duration.as_millis() as u64,
                    remote_addr = %remote_addr,
                    "Request rejected"
                ),
                _ => tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status_code = status_code,
                    duration_ms = duration.as_millis() as u64,
                    remote_addr = %remote_addr,
                    "Request failed"
                ),
            }

            Ok(response)
        })
    }
}
