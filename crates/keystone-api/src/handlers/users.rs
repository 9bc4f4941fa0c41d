//! User management API handlers
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::response::ResponseTemplate;
use crate::state::AppState;
use crate::users::{CreateUserRequest, UpdateUserRequest, UserInfo, UserListQuery, UserPage};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Create a new user (admin only)
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User successfully created", body = UserInfo),
        (status = 400, description = "Invalid input or email already exists"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let user_info = state.users.create_user(request).await?;

    audit_log(&AuditEvent::UserCreated {
        user_id: user_info.id,
        email: user_info.email.clone(),
    });

    Ok((
        StatusCode::CREATED,
        Json(ResponseTemplate::ok(
            201,
            "User successfully created",
            user_info,
        )),
    ))
}

/// Paginated list of active users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Paginated list of users", body = UserPage),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.users.user_list(query).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "Paginated list of users",
        page,
    )))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved successfully", body = UserInfo),
        (status = 400, description = "Unknown user"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user_info = state.users.user_by_id(id).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "User retrieved successfully",
        user_info,
    )))
}

/// Update a user by ID (admin or editor)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = UserInfo),
        (status = 400, description = "Invalid input or unknown user"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let user_info = state.users.update_user(id, request).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "User updated successfully",
        user_info,
    )))
}

/// Soft-delete a user by ID (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 400, description = "Unknown user"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.users.delete_user(id).await?;

    audit_log(&AuditEvent::UserDeleted { user_id: id });

    Ok(Json(ResponseTemplate::ok(
        200,
        "User deleted successfully",
        "User deleted successfully".to_string(),
    )))
}
