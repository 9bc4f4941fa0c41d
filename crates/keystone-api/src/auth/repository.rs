//! Refresh token store
//!
//! Persistence layer for refresh-token rows. All mutations run against a
//! caller-supplied transaction so the auth service can commit or roll back
//! the whole rotation as one unit of work.

use super::models::RefreshTokenRecord;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Digest a raw token value for storage and lookup
///
/// The store never sees raw refresh tokens; both writes and reads operate
/// on the SHA-256 hex digest of the issued JWT.
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Repository for the `refresh_tokens` table
#[derive(Debug, Clone, Default)]
pub struct RefreshTokenRepository;

impl RefreshTokenRepository {
    pub fn new() -> Self {
        Self
    }

    /// Persist a new active refresh-token row
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_digest: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, token, user_id, expires_at, is_active, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(token_digest)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Deactivate every active refresh token owned by a user
    ///
    /// Rows are kept for audit history; only the active flag flips.
    pub async fn deactivate_all_for_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET is_active = FALSE WHERE user_id = $1 AND is_active = TRUE")
                .bind(user_id)
                .execute(&mut **tx)
                .await?;

        Ok(result.rows_affected())
    }

    /// Check that a presented token maps to an active, unexpired row owned
    /// by the user.
    ///
    /// Fails closed: a lookup miss, inactive row, or expired row all read
    /// as invalid. The read goes through the open transaction so the row
    /// is covered by its isolation.
    pub async fn validate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        token_digest: &str,
    ) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT id, token, user_id, expires_at, is_active, created_at \
             FROM refresh_tokens WHERE token = $1 AND user_id = $2",
        )
        .bind(token_digest)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.is_some_and(|r| r.is_usable()))
    }

    /// Atomically deactivate the presented token, but only if it is still
    /// active and unexpired at write time.
    ///
    /// Returns false when zero rows were updated - meaning a concurrent
    /// refresh already consumed the token. This conditional update, not a
    /// read-then-write, is what keeps per-user rotation linearizable.
    pub async fn consume(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        token_digest: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET is_active = FALSE \
             WHERE token = $1 AND user_id = $2 AND is_active = TRUE AND expires_at > NOW()",
        )
        .bind(token_digest)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
