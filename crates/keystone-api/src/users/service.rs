//! User management service layer
//!
//! Business logic for account CRUD. Mutations run inside a unit of work;
//! reads go straight to the repository. Missing users surface as the same
//! generic credentials error the login path uses, so lookups cannot be
//! used to enumerate accounts.

use super::repository::{UserInfo, UserRepository};
use crate::auth::models::UserRole;
use crate::auth::password::hash_password;
use crate::db::UnitOfWork;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// User creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    pub role: UserRole,
}

/// User update request; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,

    pub role: Option<UserRole>,

    pub is_active: Option<bool>,
}

/// Query parameters for the user list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Substring filter on name
    pub name: Option<String>,

    /// Substring filter on email
    pub email: Option<String>,

    /// Page number (1-indexed)
    pub page: Option<u32>,

    /// Items per page
    pub limit: Option<u32>,

    /// Sort column: name, email, created_at, updated_at
    pub sort_by: Option<String>,

    /// Sort order: asc or desc
    pub order: Option<String>,
}

/// Paginated user list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub users: Vec<UserInfo>,
    pub total: i64,
    pub page: u32,
    pub total_pages: i64,
}

/// User management service
#[derive(Debug, Clone)]
pub struct UsersService {
    uow: UnitOfWork,
    repo: UserRepository,
}

impl UsersService {
    pub fn new(uow: UnitOfWork, repo: UserRepository) -> Self {
        Self { uow, repo }
    }

    /// Create a new user with a freshly hashed password
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserInfo, AppError> {
        let password_hash = hash_password(&request.password)?;

        let mut tx = self.uow.begin().await?;
        let record = self
            .repo
            .insert(&mut tx, &request.name, &request.email, &password_hash, request.role)
            .await
            .map_err(unique_email_violation)?;
        tx.commit().await?;

        Ok(record.to_info())
    }

    /// Paginated listing of active users
    pub async fn user_list(&self, query: UserListQuery) -> Result<UserPage, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = i64::from(query.limit.unwrap_or(10).clamp(1, 100));
        let offset = i64::from(page - 1) * limit;
        let descending = matches!(query.order.as_deref(), Some("desc") | Some("DESC"));

        let (rows, total) = self
            .repo
            .list(
                query.name.as_deref(),
                query.email.as_deref(),
                query.sort_by.as_deref(),
                descending,
                limit,
                offset,
            )
            .await?;

        Ok(UserPage {
            users: rows.iter().map(|r| r.to_info()).collect(),
            total,
            page,
            total_pages: (total + limit - 1) / limit,
        })
    }

    /// Fetch a single user by id
    pub async fn user_by_id(&self, id: Uuid) -> Result<UserInfo, AppError> {
        let record = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        Ok(record.to_info())
    }

    /// Update profile fields; the password, when present, is re-hashed
    pub async fn update_user(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> Result<UserInfo, AppError> {
        let password_hash = match &request.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let mut tx = self.uow.begin().await?;
        let record = self
            .repo
            .update(
                &mut tx,
                id,
                request.name.as_deref(),
                request.email.as_deref(),
                password_hash.as_deref(),
                request.role,
                request.is_active,
            )
            .await
            .map_err(unique_email_violation)?
            .ok_or(AppError::InvalidCredentials)?;
        tx.commit().await?;

        Ok(record.to_info())
    }

    /// Soft-delete a user; the row survives with is_active = FALSE
    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.uow.begin().await?;
        let deleted = self.repo.soft_delete(&mut tx, id).await?;
        if !deleted {
            return Err(AppError::InvalidCredentials);
        }
        tx.commit().await?;

        Ok(())
    }

    /// Seed the default admin account when the users table is empty
    pub async fn seed_default_admin(&self, password: &str) -> Result<(), AppError> {
        if self.repo.count_all().await? > 0 {
            tracing::debug!("Users already exist, skipping default admin creation");
            return Ok(());
        }

        tracing::info!("No users found, creating default admin user");
        self.create_user(CreateUserRequest {
            name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            password: password.to_string(),
            role: UserRole::Admin,
        })
        .await?;

        Ok(())
    }
}

/// Map a unique-constraint violation on users.email to a client error
fn unique_email_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::BadRequest("Email already exists".to_string());
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let valid = CreateUserRequest {
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
            role: UserRole::Viewer,
        };
        assert!(valid.validate().is_ok());

        let bad_email = CreateUserRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = CreateUserRequest {
            password: "abc".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_update_request_allows_partial_fields() {
        let partial = UpdateUserRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        assert!(partial.validate().is_ok());

        let bad = UpdateUserRequest {
            password: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
