//! User persistence layer
//!
//! Plain row store over the `users` table. Password verification happens
//! in the services against the hash carried by `UserRecord`; the record
//! type never crosses the HTTP boundary - handlers only ever see
//! `UserInfo`.

use crate::auth::models::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use utoipa::ToSchema;
use uuid::Uuid;

/// Internal user row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Public projection without credential material
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: UserRole::parse(&self.role).unwrap_or(UserRole::Viewer),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User information returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column allowlist for user list sorting
fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("name") => "name",
        Some("email") => "email",
        Some("updated_at") => "updated_at",
        _ => "created_at",
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";

/// Repository for the `users` table
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by email, regardless of active flag
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a user by id, regardless of active flag
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Insert a new active user
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<UserRecord, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, name, email, password_hash, role, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, TRUE, NOW(), NOW()) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&mut **tx)
        .await
    }

    /// Update profile fields; absent fields keep their current value
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET \
                 name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 password_hash = COALESCE($4, password_hash), \
                 role = COALESCE($5, role), \
                 is_active = COALESCE($6, is_active), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.map(|r| r.as_str()))
        .bind(is_active)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Soft delete: flip the active flag, keep the row
    pub async fn soft_delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&mut **tx)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Paginated list of active users with optional substring filters
    pub async fn list(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        sort_by: Option<&str>,
        descending: bool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<UserRecord>, i64), sqlx::Error> {
        let filter = "is_active = TRUE \
             AND ($1::text IS NULL OR name ILIKE '%' || $1 || '%') \
             AND ($2::text IS NULL OR email ILIKE '%' || $2 || '%')";

        let order = if descending { "DESC" } else { "ASC" };
        let column = sort_column(sort_by);

        let rows = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {filter} \
             ORDER BY {column} {order} LIMIT $3 OFFSET $4"
        ))
        .bind(name)
        .bind(email)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM users WHERE {filter}"
        ))
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    /// Total number of users, active or not (used by the seeder)
    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }
}
