//! API error handling
//!
//! One application error type carries the auth taxonomy and the generic
//! failure buckets; the HTTP mapping lives in its `IntoResponse` impl.
//! Credential-stage failures share deliberately generic messages so a
//! caller cannot probe which input was wrong.
//!
//! Author: hephaex@gmail.com

use crate::response::ResponseTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad email/password, inactive user, or unknown subject on refresh
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signature or expiry failure on a presented token's own envelope
    #[error("Invalid token")]
    InvalidToken,

    /// Well-formed token that is not an active, unexpired, owned row
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error may surface its own message to the caller.
    ///
    /// Everything else is reported with an opaque message and the detail
    /// attached separately for diagnostics.
    fn is_client_error(&self) -> bool {
        !matches!(self, AppError::Database(_) | AppError::Internal(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InvalidRefreshToken
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::NOT_IMPLEMENTED,
        };

        let body = if self.is_client_error() {
            ResponseTemplate::<()>::error(status.as_u16(), self.to_string())
        } else {
            ResponseTemplate::<()>::error_with_detail(
                status.as_u16(),
                "An unexpected error occurred".to_string(),
                self.to_string(),
            )
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::auth::password::PasswordError> for AppError {
    fn from(err: crate::auth::password::PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<crate::files::FileStorageError> for AppError {
    fn from(err: crate::files::FileStorageError) -> Self {
        use crate::files::FileStorageError;

        match err {
            FileStorageError::InvalidFileName(_)
            | FileStorageError::MissingOwner
            | FileStorageError::NotFound(_) => AppError::BadRequest(err.to_string()),
            FileStorageError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<keystone_core::CoreError> for AppError {
    fn from(err: keystone_core::CoreError) -> Self {
        use keystone_core::CoreError;

        match err {
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            CoreError::ValidationError(msg) => AppError::BadRequest(msg),
            CoreError::DatabaseError(msg) => AppError::Database(msg),
            CoreError::StorageError(msg) => AppError::Internal(msg),
            CoreError::ConfigError(msg) => AppError::Internal(msg),
            CoreError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
