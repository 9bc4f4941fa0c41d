//! Authentication service layer
//!
//! Orchestrates credential validation, token generation, and refresh-token
//! rotation inside one transaction per operation. Every exit path after
//! `begin()` either commits or drops the handle (implicit rollback), so a
//! failure can never leave a half-persisted token pair behind.

use super::jwt::{generate_access_token, generate_refresh_token, validate_token, JwtError};
use super::models::TokenInfo;
use super::password::verify_password;
use super::repository::{digest_token, RefreshTokenRepository};
use crate::audit::{audit_log, AuditEvent};
use crate::db::UnitOfWork;
use crate::error::AppError;
use crate::users::repository::{UserRecord, UserRepository};
use chrono::{Duration, Utc};
use keystone_core::config::AuthConfig;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// User login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Authentication service
#[derive(Debug, Clone)]
pub struct AuthService {
    uow: UnitOfWork,
    users: UserRepository,
    tokens: RefreshTokenRepository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        uow: UnitOfWork,
        users: UserRepository,
        tokens: RefreshTokenRepository,
        config: AuthConfig,
    ) -> Self {
        Self {
            uow,
            users,
            tokens,
            config,
        }
    }

    /// Login with email and password
    ///
    /// A successful login supersedes every prior refresh token for the
    /// user - one active session at a time. Access tokens already in the
    /// wild stay valid until their own expiry; they are not
    /// revocation-checked.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenInfo, AppError> {
        let user = match self.validate_credentials(email, password).await {
            Ok(user) => user,
            Err(err) => {
                audit_log(&AuditEvent::LoginFailure {
                    email: email.to_string(),
                    reason: "credential validation failed".to_string(),
                });
                return Err(err);
            }
        };

        let mut tx = self.uow.begin().await?;

        self.tokens.deactivate_all_for_user(&mut tx, user.id).await?;
        let token_info = self.issue_tokens(&mut tx, &user).await?;

        tx.commit().await?;

        audit_log(&AuditEvent::LoginSuccess {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(token_info)
    }

    /// Exchange a refresh token for a new access/refresh pair
    ///
    /// Rotation is conditioned on the presented row still being active at
    /// write time, so of two concurrent refreshes with the same token
    /// exactly one succeeds; the other observes the row already consumed.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenInfo, AppError> {
        let result = self.rotate(refresh_token).await;

        match &result {
            Ok(_) => {}
            Err(err) => audit_log(&AuditEvent::TokenRefreshFailure {
                reason: err.to_string(),
            }),
        }

        result
    }

    async fn rotate(&self, refresh_token: &str) -> Result<TokenInfo, AppError> {
        // The token's own envelope first: signature and payload expiry
        let claims = validate_token(&self.config, refresh_token).map_err(jwt_to_app_error)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        let mut tx = self.uow.begin().await?;

        // Then the stored row: must exist, be owned, active, and unexpired
        let digest = digest_token(refresh_token);
        if !self.tokens.validate(&mut tx, user.id, &digest).await? {
            return Err(AppError::InvalidRefreshToken);
        }

        // Conditional consume catches a concurrent refresh racing on the
        // same row between the read above and this write
        if !self.tokens.consume(&mut tx, user.id, &digest).await? {
            return Err(AppError::InvalidRefreshToken);
        }
        self.tokens.deactivate_all_for_user(&mut tx, user.id).await?;

        let token_info = self.issue_tokens(&mut tx, &user).await?;

        tx.commit().await?;

        audit_log(&AuditEvent::TokenRefresh {
            user_id: user.id,
            email: user.email.clone(),
        });

        Ok(token_info)
    }

    /// Look up the user and verify the password hash.
    ///
    /// Unknown email, inactive account, and wrong password all collapse
    /// into the same error so callers cannot tell them apart.
    async fn validate_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Sign a new access/refresh pair and persist the refresh row in the
    /// caller's transaction
    async fn issue_tokens(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &UserRecord,
    ) -> Result<TokenInfo, AppError> {
        let access_token = generate_access_token(&self.config, user.id, &user.email, &user.role)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let refresh_token = generate_refresh_token(&self.config, user.id, &user.email, &user.role)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_token_secs as i64);
        self.tokens
            .create(tx, &digest_token(&refresh_token), user.id, expires_at)
            .await?;

        Ok(TokenInfo {
            access_token,
            refresh_token,
            expires_in: format!("{}s", self.config.access_token_secs),
        })
    }
}

/// A presented token whose own envelope fails verification is an
/// `InvalidToken`, distinct from a rotated/revoked row
fn jwt_to_app_error(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken | JwtError::InvalidSignature | JwtError::InvalidToken => {
            AppError::InvalidToken
        }
        other => AppError::Internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_failures_map_to_invalid_token() {
        assert!(matches!(
            jwt_to_app_error(JwtError::ExpiredToken),
            AppError::InvalidToken
        ));
        assert!(matches!(
            jwt_to_app_error(JwtError::InvalidSignature),
            AppError::InvalidToken
        ));
        assert!(matches!(
            jwt_to_app_error(JwtError::InvalidToken),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_password = LoginRequest {
            password: String::new(),
            ..valid.clone()
        };
        assert!(empty_password.validate().is_err());

        let bad_email = LoginRequest {
            email: "nope".to_string(),
            ..valid
        };
        assert!(bad_email.validate().is_err());
    }
}
