//! Fraud detection endpoints.
//!
//! This module provides the transaction check handler, which scores a fixed
//! four-feature vector against the fitted anomaly model, persists the verdict,
//! and fires an admin email alert for suspicious results. All endpoints require
//! a valid bearer token.

use crate::{
    AppState,
    auth_middleware::AuthMiddleware,
    detection::TransactionFeatures,
    models::FraudLog,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct TransactionRequest {
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(range(min = 0, max = 150))]
    pub customer_age: i32,
    #[validate(range(min = 0))]
    pub login_attempts: i32,
    pub account_balance: f64,
}

/// Registers all fraud endpoints under `/fraud`.
pub fn configure_fraud_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fraud")
            .route("/check", web::post().to(check_transaction))
            .route("/history", web::get().to(get_fraud_history)),
    );
}

/// Scores a transaction against the anomaly model.
///
/// # HTTP Method
/// `POST /fraud/check`
///
/// # Authentication
/// Requires valid bearer token in the Authorization header.
///
/// # Request Body (JSON)
/// ```json
/// {
///   "amount": 12500.0,        // Number, >= 0, transaction amount
///   "customer_age": 34,       // Integer, 0-150
///   "login_attempts": 2,      // Integer, >= 0
///   "account_balance": 8100.0 // Number, balance at check time
/// }
/// ```
///
/// # Success Response (200 OK)
/// ```json
/// {
///   "is_suspicious": false,
///   "message": "Transaction appears normal."
/// }
/// ```
///
/// # Error Responses
/// - `400 Bad Request`: Validation errors (negative amount, out-of-range age)
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `500 Internal Server Error`: Database errors
///
/// # Side Effects
/// - Inserts a record into `fraud_logs` with the scored features and verdict.
/// - On a suspicious verdict, spawns a fire-and-forget admin email alert;
///   delivery failures are logged and never affect the response.
#[tracing::instrument(skip(user, state, form), fields(user_id = %user.user_id))]
pub async fn check_transaction(
    user: AuthMiddleware,
    state: web::Data<AppState>,
    form: web::Json<TransactionRequest>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}));
    }

    let features = TransactionFeatures {
        amount: form.amount,
        customer_age: form.customer_age as f64,
        login_attempts: form.login_attempts as f64,
        account_balance: form.account_balance,
    };
    let verdict = state.detector.assess(&features);

    tracing::info!(
        user.id = %user.user_id,
        amount = form.amount,
        score = verdict.score,
        is_suspicious = verdict.is_suspicious,
        "Transaction scored"
    );

    let record = FraudLog {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        amount: form.amount,
        customer_age: form.customer_age,
        login_attempts: form.login_attempts,
        account_balance: form.account_balance,
        is_suspicious: verdict.is_suspicious,
        message: verdict.message.clone(),
        checked_at: Utc::now(),
    };

    let inserted = sqlx::query(
        r#"INSERT INTO fraud_logs
        (id, user_id, amount, customer_age, login_attempts, account_balance, is_suspicious, message, checked_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
    )
    .bind(record.id)
    .bind(record.user_id)
    .bind(record.amount)
    .bind(record.customer_age)
    .bind(record.login_attempts)
    .bind(record.account_balance)
    .bind(record.is_suspicious)
    .bind(&record.message)
    .bind(record.checked_at)
    .execute(state.db.as_ref())
    .await;

    if let Err(e) = inserted {
        tracing::error!(user.id = %user.user_id, error = ?e, "Failed to persist fraud check");
        return HttpResponse::InternalServerError()
            .json(serde_json::json!({"error": format!("Failed to record check: {e}")}));
    }

    if verdict.is_suspicious {
        match state.mailer.clone() {
            Some(mailer) => {
                let alert_record = record.clone();
                tokio::spawn(async move {
                    if let Err(e) = mailer.send_suspicious_alert(&alert_record).await {
                        tracing::error!(error = %e, "Failed to send alert email");
                    }
                });
            }
            None => {
                tracing::warn!(
                    check.id = %record.id,
                    "Suspicious transaction but alert mailer is not configured"
                );
            }
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "is_suspicious": verdict.is_suspicious,
        "message": verdict.message
    }))
}

/// Lists the authenticated user's recent fraud checks, newest first.
///
/// # HTTP Method
/// `GET /fraud/history`
///
/// # Error Responses
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `500 Internal Server Error`: Database errors
///
/// Returns up to 50 most recent checks.
#[tracing::instrument(skip(user, state), fields(user_id = %user.user_id))]
pub async fn get_fraud_history(user: AuthMiddleware, state: web::Data<AppState>) -> impl Responder {
    tracing::debug!(user.id = %user.user_id, "Fetching fraud check history");

    let rows = sqlx::query_as::<_, FraudLog>(
        r#"SELECT id, user_id, amount, customer_age, login_attempts, account_balance,
            is_suspicious, message, checked_at
        FROM fraud_logs WHERE user_id = $1 ORDER BY checked_at DESC LIMIT 50"#,
    )
    .bind(user.user_id)
    .fetch_all(state.db.as_ref())
    .await;

    match rows {
        Ok(checks) => {
            tracing::info!(
                user.id = %user.user_id,
                check_count = checks.len(),
                "Fraud check history retrieved"
            );
            HttpResponse::Ok().json(checks)
        }
        Err(e) => {
            tracing::error!(user.id = %user.user_id, error = ?e, "Failed to fetch fraud history");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("Failed to fetch history: {e}")}))
        }
    }
}
