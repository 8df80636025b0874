//! Access-token creation and verification for the SmartBank backend.
//!
//! Tokens are HS256 JWTs carrying the user id, email, and an expiry claim.
//! The default lifetime is 24 hours.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Authenticated user's id
    pub user_id: Uuid,
    /// Authenticated user's email
    pub email: String,
    /// Expiry as a Unix timestamp
    pub exp: i64,
}

/// Errors produced when verifying an access token.
///
/// The `Display` text doubles as the client-facing 401 detail, so the two
/// variants keep the exact wording the API documents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token's `exp` claim is in the past.
    #[error("Token expired")]
    Expired,
    /// The token is malformed, has a bad signature, or misses required claims.
    #[error("Invalid token")]
    Invalid,
}

/// Creates a signed access token for the given user.
///
/// # Arguments
/// * `secret` - HMAC signing secret
/// * `user_id` - id embedded in the `user_id` claim
/// * `email` - email embedded in the `email` claim
/// * `expires_in_secs` - lifetime added to the current time for the `exp` claim
pub fn create_access_token(
    secret: &str,
    user_id: Uuid,
    email: &str,
    expires_in_secs: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        user_id,
        email: email.to_owned(),
        exp: Utc::now().timestamp() + expires_in_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decodes and verifies an access token, returning its claims.
///
/// # Errors
/// Returns [`TokenError::Expired`] for a valid-but-stale token and
/// [`TokenError::Invalid`] for anything else (bad signature, garbage input,
/// missing claims).
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_claims() {
        let user_id = Uuid::new_v4();
        let token = create_access_token(SECRET, user_id, "user@example.com", 3600)
            .expect("token creation should succeed");

        let claims = decode_token(SECRET, &token).expect("token should verify");
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn rejects_expired_token() {
        let token = create_access_token(SECRET, Uuid::new_v4(), "user@example.com", -3600)
            .expect("token creation should succeed");

        assert_eq!(decode_token(SECRET, &token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = create_access_token(SECRET, Uuid::new_v4(), "user@example.com", 3600)
            .expect("token creation should succeed");

        assert_eq!(
            decode_token("other-secret", &token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            decode_token(SECRET, "not.a.token"),
            Err(TokenError::Invalid)
        );
    }
}
