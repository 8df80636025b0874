//! Authentication middleware for extracting user context from bearer tokens.
//!
//! # Overview
//! This module provides [`AuthMiddleware`], an Actix Web extractor that injects a
//! [`UserContext`] into handlers. It parses the `Authorization: Bearer <token>`
//! header and verifies the token signature and expiry against the application's
//! JWT secret. No database round-trip is needed; the claims carry everything the
//! handlers use.
//!
//! # Usage
//! In handlers, add `user: AuthMiddleware` as an argument to receive the
//! authenticated user's context.
//!
//! # Errors
//! Returns 401 Unauthorized if the header is missing or malformed, if the token
//! signature is invalid, or if the token has expired.

use crate::{AppState, jwt};
use actix_web::{FromRequest, HttpRequest};
use futures::future::{Ready, ready};
use serde::Deserialize;
use std::ops::Deref;
use tracing::Span;
use uuid::Uuid;

/// Represents the authenticated user's context, extracted from the access token.
#[derive(Debug, Clone, Deserialize)]
pub struct UserContext {
    /// User's unique identifier
    pub user_id: Uuid,
    /// User's email address
    pub email: String,
}

/// Actix Web extractor for injecting [`UserContext`] into handlers.
///
/// Validates the Authorization header and decodes the access token locally.
#[derive(Debug, Clone)]
pub struct AuthMiddleware(pub UserContext);

impl Deref for AuthMiddleware {
    type Target = UserContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthMiddleware {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(extract_user(req))
    }
}

fn extract_user(req: &HttpRequest) -> Result<AuthMiddleware, actix_web::Error> {
    let app_data = req
        .app_data::<actix_web::web::Data<AppState>>()
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("AppState missing"))?;

    tracing::debug!("Extracting auth token from request");

    let token = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| {
            tracing::warn!("No Authorization header present in request");
            actix_web::error::ErrorUnauthorized("no authorization header")
        })?
        .to_str()
        .map_err(|e| {
            tracing::warn!(error = ?e, "Invalid Authorization header format");
            actix_web::error::ErrorUnauthorized(format!("invalid header format {e}"))
        })?
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            tracing::warn!("Authorization header missing Bearer prefix");
            actix_web::error::ErrorUnauthorized("invalid auth header")
        })?;

    let claims = jwt::decode_token(&app_data.jwt_secret, token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        actix_web::error::ErrorUnauthorized(e.to_string())
    })?;

    let ctx = UserContext {
        user_id: claims.user_id,
        email: claims.email,
    };

    tracing::debug!(
        user_id = %ctx.user_id,
        email = %ctx.email,
        "User authenticated successfully"
    );

    Span::current().record("user_id", ctx.user_id.to_string());
    Ok(AuthMiddleware(ctx))
}
