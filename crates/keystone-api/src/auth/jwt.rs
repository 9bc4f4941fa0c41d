//! JWT token generation and validation
//!
//! Both access and refresh tokens are HMAC-SHA256 signed JWTs carrying the
//! same claim set; they differ only in lifetime. Refresh tokens are
//! additionally persisted (as digests) and checked against the store.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keystone_core::config::AuthConfig;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - user ID
    pub sub: String,
    /// User's email address
    pub email: String,
    /// User's role (admin, editor, viewer)
    pub role: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
}

/// JWT token generation and validation errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token format")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("System time error: {0}")]
    SystemTimeError(#[from] std::time::SystemTimeError),
}

fn sign_token(
    config: &AuthConfig,
    user_id: Uuid,
    email: &str,
    role: &str,
    lifetime_secs: u64,
) -> Result<String, JwtError> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        iss: config.issuer.clone(),
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + lifetime_secs,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Generate a short-lived access token
pub fn generate_access_token(
    config: &AuthConfig,
    user_id: Uuid,
    email: &str,
    role: &str,
) -> Result<String, JwtError> {
    sign_token(config, user_id, email, role, config.access_token_secs)
}

/// Generate a refresh token with the configured longer lifetime
pub fn generate_refresh_token(
    config: &AuthConfig,
    user_id: Uuid,
    email: &str,
    role: &str,
) -> Result<String, JwtError> {
    sign_token(config, user_id, email, role, config.refresh_token_secs)
}

/// Validate a token's signature and expiry and extract its claims
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
        _ => JwtError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
