//! KYC document endpoints.
//!
//! This module provides handlers for uploading KYC documents and listing the
//! caller's uploads. All endpoints require a valid bearer token.

use crate::{AppState, auth_middleware::AuthMiddleware, models::KycDocument};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct KycUploadRequest {
    #[validate(length(min = 1, max = 50))]
    pub document_type: String,
    #[validate(length(min = 1, max = 100))]
    pub document_number: String,
}

/// Registers all KYC endpoints under `/kyc`.
pub fn configure_kyc_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/kyc")
            .route("/upload", web::post().to(upload_document))
            .route("/documents", web::get().to(get_documents)),
    );
}

/// Records a KYC document for the authenticated user.
///
/// # HTTP Method
/// `POST /kyc/upload`
///
/// # Authentication
/// Requires valid bearer token in the Authorization header.
///
/// # Request Body (JSON)
/// ```json
/// {
///   "document_type": "passport",      // String, 1-50 chars
///   "document_number": "P123456789"   // String, 1-100 chars
/// }
/// ```
///
/// # Success Response (201 Created)
/// ```json
/// {
///   "message": "KYC document uploaded successfully",
///   "user_id": "550e8400-e29b-41d4-a716-446655440000",
///   "document_type": "passport",
///   "status": "PENDING"
/// }
/// ```
///
/// # Error Responses
/// - `400 Bad Request`: Validation errors (empty or oversized fields)
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `500 Internal Server Error`: Database errors
///
/// # Side Effects
/// - Inserts a record into `kyc_documents` with status `PENDING`; review to
///   `VERIFIED` happens out of band.
#[tracing::instrument(skip(user, state, form), fields(user_id = %user.user_id))]
pub async fn upload_document(
    user: AuthMiddleware,
    state: web::Data<AppState>,
    form: web::Json<KycUploadRequest>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}));
    }

    tracing::info!(
        user.id = %user.user_id,
        document_type = %form.document_type,
        "Uploading KYC document"
    );

    let document_id = Uuid::new_v4();
    let inserted = sqlx::query(
        r#"INSERT INTO kyc_documents (id, user_id, document_type, document_number, status)
        VALUES ($1, $2, $3, $4, 'PENDING')"#,
    )
    .bind(document_id)
    .bind(user.user_id)
    .bind(&form.document_type)
    .bind(&form.document_number)
    .execute(state.db.as_ref())
    .await;

    match inserted {
        Ok(_) => {
            tracing::info!(
                user.id = %user.user_id,
                document.id = %document_id,
                document_type = %form.document_type,
                "KYC document recorded"
            );
            HttpResponse::Created().json(serde_json::json!({
                "message": "KYC document uploaded successfully",
                "user_id": user.user_id,
                "document_type": form.document_type,
                "status": "PENDING"
            }))
        }
        Err(e) => {
            tracing::error!(
                user.id = %user.user_id,
                error = ?e,
                "Failed to record KYC document"
            );
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("Failed to upload document: {e}")}))
        }
    }
}

/// Lists the authenticated user's KYC documents, newest first.
///
/// # HTTP Method
/// `GET /kyc/documents`
///
/// # Error Responses
/// - `401 Unauthorized`: Missing or invalid bearer token
/// - `500 Internal Server Error`: Database errors
///
/// Returns up to 50 most recent documents.
#[tracing::instrument(skip(user, state), fields(user_id = %user.user_id))]
pub async fn get_documents(user: AuthMiddleware, state: web::Data<AppState>) -> impl Responder {
    tracing::debug!(user.id = %user.user_id, "Fetching KYC documents");

    let rows = sqlx::query_as::<_, KycDocument>(
        r#"SELECT id, user_id, document_type, document_number, status, uploaded_at
        FROM kyc_documents WHERE user_id = $1 ORDER BY uploaded_at DESC LIMIT 50"#,
    )
    .bind(user.user_id)
    .fetch_all(state.db.as_ref())
    .await;

    match rows {
        Ok(documents) => {
            tracing::info!(
                user.id = %user.user_id,
                document_count = documents.len(),
                "KYC documents retrieved"
            );
            HttpResponse::Ok().json(documents)
        }
        Err(e) => {
            tracing::error!(user.id = %user.user_id, error = ?e, "Failed to fetch KYC documents");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("Failed to fetch documents: {e}")}))
        }
    }
}
