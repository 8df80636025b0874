//! Data models for users, KYC documents, and fraud checks.
//!
//! This module defines all serializable structs used for DB access and API responses.
//! Models derive Serde and SQLx traits for easy (de)serialization and DB mapping.

use std::{env, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{db, detection::AnomalyDetector, services::AlertMailer};

/// Default bearer-token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 60 * 60 * 24;

/// Represents a registered user.
///
/// The password hash never leaves the database through this struct; handlers
/// that verify credentials query the hash column separately.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    /// User's unique identifier
    pub id: Uuid,
    /// User's display name
    pub name: String,
    /// User's email address
    pub email: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// A KYC document uploaded by a user.
///
/// Documents start in `PENDING` status and move to `VERIFIED` once reviewed.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct KycDocument {
    /// Document's unique identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Document category (e.g., "passport", "driving_license")
    pub document_type: String,
    /// Issuer-assigned document number
    pub document_number: String,
    /// Review status: `PENDING` or `VERIFIED`
    pub status: String,
    /// When the document was uploaded
    pub uploaded_at: DateTime<Utc>,
}

/// A persisted fraud-check record.
///
/// One row per call to the fraud check endpoint, capturing the scored feature
/// vector alongside the classifier's verdict.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FraudLog {
    /// Record's unique identifier
    pub id: Uuid,
    /// User who submitted the check
    pub user_id: Uuid,
    /// Transaction amount
    pub amount: f64,
    /// Customer age in years
    pub customer_age: i32,
    /// Recent login attempts
    pub login_attempts: i32,
    /// Account balance at check time
    pub account_balance: f64,
    /// Classifier verdict
    pub is_suspicious: bool,
    /// Human-readable verdict message
    pub message: String,
    /// When the check ran
    pub checked_at: DateTime<Utc>,
}

/// Shared application state for all handlers.
///
/// Holds the SQLx Postgres connection pool, JWT signing configuration, the
/// fitted anomaly detector, and the optional SMTP alert transport.
#[derive(Clone)]
pub struct AppState {
    /// SQLx Postgres connection pool
    pub db: Arc<sqlx::PgPool>,
    /// Secret used to sign and verify access tokens
    pub jwt_secret: String,
    /// Access-token lifetime in seconds
    pub token_expiry_secs: i64,
    /// Fitted anomaly-detection model
    pub detector: Arc<AnomalyDetector>,
    /// SMTP transport for admin alerts; `None` disables alerting
    pub mailer: Option<Arc<AlertMailer>>,
}

impl AppState {
    /// Creates a new `AppState` from environment configuration.
    ///
    /// Reads the following environment variables:
    /// - `DATABASE_URL`: Postgres connection string (used by [`db::connect_pg_pool`])
    /// - `JWT_SECRET`: HMAC secret for access tokens (required)
    /// - `TOKEN_EXPIRY_SECS`: token lifetime override (optional, default 86400)
    /// - `MODEL_TRAINING_DATA`: path to the training CSV (optional, default
    ///   `data/bank_transactions.csv`)
    /// - `MODEL_CACHE_PATH`: path for the fitted-model cache (optional, default
    ///   `data/anomaly_model.json`)
    /// - `SMTP_HOST` / `EMAIL_SENDER` / `EMAIL_PASSWORD` / `ADMIN_EMAIL`: alert
    ///   mail configuration (optional; alerting is disabled when absent)
    ///
    /// The anomaly detector is loaded from its cache when present, otherwise
    /// trained from the CSV and cached for later boots.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is missing, mirroring the hard requirement on
    /// `DATABASE_URL`.
    pub async fn new() -> anyhow::Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let token_expiry_secs = env::var("TOKEN_EXPIRY_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY_SECS);

        let training_data = env::var("MODEL_TRAINING_DATA")
            .unwrap_or_else(|_| "data/bank_transactions.csv".to_string());
        let model_cache = env::var("MODEL_CACHE_PATH")
            .unwrap_or_else(|_| "data/anomaly_model.json".to_string());
        let detector = AnomalyDetector::load_or_train(&training_data, &model_cache)?;

        let mailer = AlertMailer::from_env();
        if mailer.is_none() {
            tracing::warn!("Alert mailer not configured; suspicious transactions will not be emailed");
        }

        let db = db::connect_pg_pool().await;

        Ok(Self {
            db: Arc::new(db),
            jwt_secret,
            token_expiry_secs,
            detector: Arc::new(detector),
            mailer: mailer.map(Arc::new),
        })
    }

    /// Builds an `AppState` from pre-constructed parts.
    ///
    /// Used by integration tests, which supply a lazily-connected pool and a
    /// detector fitted on in-memory samples instead of reading the environment.
    pub fn with_parts(
        db: sqlx::PgPool,
        jwt_secret: impl Into<String>,
        detector: AnomalyDetector,
        mailer: Option<AlertMailer>,
    ) -> Self {
        Self {
            db: Arc::new(db),
            jwt_secret: jwt_secret.into(),
            token_expiry_secs: DEFAULT_TOKEN_EXPIRY_SECS,
            detector: Arc::new(detector),
            mailer: mailer.map(Arc::new),
        }
    }
}
