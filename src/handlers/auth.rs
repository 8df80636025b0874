//! User authentication endpoints: registration and login.
//!
//! These endpoints sanitize input, store bcrypt-hashed credentials, and issue
//! signed access tokens for the protected KYC and fraud routes.

use crate::{AppState, jwt};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Credential columns fetched during login.
#[derive(Debug, FromRow)]
struct CredentialRow {
    id: Uuid,
    password_hash: String,
}

/// Registers all authentication endpoints.
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login));
}

/// Registers a new user account.
///
/// # HTTP Method
/// `POST /register`
///
/// # Request Body (JSON)
/// ```json
/// {
///   "name": "John Doe",           // String, 1-100 chars, user's display name
///   "email": "john@example.com",  // String, valid email format
///   "password": "SecurePass123"   // String, 6-72 chars, account password
/// }
/// ```
///
/// # Success Response (201 Created)
/// ```json
/// { "message": "User registered successfully" }
/// ```
///
/// # Error Responses
/// - `400 Bad Request`: Validation errors or email already registered
/// - `500 Internal Server Error`: Database or hashing failure
///
/// # Side Effects
/// - Inserts a record into `users` with a bcrypt hash of the password; the
///   plaintext password is never stored or logged.
#[tracing::instrument(skip(state, form), fields(email = %form.email, name = %form.name))]
pub async fn register(
    state: web::Data<AppState>,
    form: web::Json<RegisterRequest>,
) -> impl Responder {
    if let Err(e) = form.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}));
    }

    tracing::info!(
        user.email = %form.email,
        user.name = %form.name,
        "Attempting user registration"
    );

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&form.email)
        .fetch_optional(state.db.as_ref())
        .await;
    match existing {
        Ok(Some(_)) => {
            tracing::warn!(user.email = %form.email, "Registration rejected: duplicate email");
            return HttpResponse::BadRequest()
                .json(serde_json::json!({"error": "Email already registered"}));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "Duplicate-email lookup failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("DB error: {e}")}));
        }
    }

    let password_hash = match bcrypt::hash(&form.password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "Password hashing failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Failed to hash password"}));
        }
    };

    let user_id = Uuid::new_v4();
    let inserted = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(&form.name)
    .bind(&form.email)
    .bind(&password_hash)
    .execute(state.db.as_ref())
    .await;

    match inserted {
        Ok(_) => {
            tracing::info!(
                user.id = %user_id,
                user.email = %form.email,
                "User registration completed successfully"
            );
            HttpResponse::Created()
                .json(serde_json::json!({"message": "User registered successfully"}))
        }
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "User insert failed");
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("registration failed: {e}")}))
        }
    }
}

/// Authenticates an existing user with email and password.
///
/// # HTTP Method
/// `POST /login`
///
/// # Request Body (JSON)
/// ```json
/// {
///   "email": "john@example.com",  // String, valid email format
///   "password": "SecurePass123"   // String, 6-72 chars, account password
/// }
/// ```
///
/// # Success Response (200 OK)
/// ```json
/// {
///   "message": "Login successful",
///   "user_id": "550e8400-e29b-41d4-a716-446655440000",
///   "access_token": "eyJhbGciOiJIUzI1NiIs...",
///   "token_type": "bearer"
/// }
/// ```
///
/// # Error Responses
/// - `400 Bad Request`: Validation errors (invalid email format, short password)
/// - `401 Unauthorized`: Invalid credentials (wrong email/password combination)
/// - `500 Internal Server Error`: Database or token-signing failure
///
/// # Usage Notes
/// - The `access_token` should be included in subsequent requests as:
///   `Authorization: Bearer {access_token}`
/// - Tokens expire after 24 hours by default (`TOKEN_EXPIRY_SECS` overrides).
/// - Unknown email and wrong password are indistinguishable in the response.
#[tracing::instrument(skip(state, form), fields(email = %form.email))]
pub async fn login(state: web::Data<AppState>, form: web::Json<LoginRequest>) -> impl Responder {
    if let Err(e) = form.validate() {
        return HttpResponse::BadRequest().json(serde_json::json!({"error": e.to_string()}));
    }

    tracing::info!(user.email = %form.email, "Attempting user login");

    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(&form.email)
    .fetch_optional(state.db.as_ref())
    .await;

    let credentials = match row {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            tracing::warn!(user.email = %form.email, "Login failed: unknown email");
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({"error": "Invalid credentials"}));
        }
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "Credential lookup failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": format!("DB error: {e}")}));
        }
    };

    match bcrypt::verify(&form.password, &credentials.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(user.email = %form.email, "Login failed: wrong password");
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({"error": "Invalid credentials"}));
        }
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "Password verification failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Failed to verify password"}));
        }
    }

    let token = match jwt::create_access_token(
        &state.jwt_secret,
        credentials.id,
        &form.email,
        state.token_expiry_secs,
    ) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(user.email = %form.email, error = ?e, "Token signing failed");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"error": "Failed to issue access token"}));
        }
    };

    tracing::info!(
        user.id = %credentials.id,
        user.email = %form.email,
        "User login successful"
    );

    HttpResponse::Ok().json(serde_json::json!({
        "message": "Login successful",
        "user_id": credentials.id,
        "access_token": token,
        "token_type": "bearer"
    }))
}
