//! Authentication API handlers
//!
//! Author: hephaex@gmail.com

use crate::auth::{AuthenticatedUser, LoginRequest, RefreshTokenRequest, TokenInfo};
use crate::error::AppError;
use crate::response::ResponseTemplate;
use crate::state::AppState;
use crate::users::UserInfo;
use axum::{extract::State, response::IntoResponse, Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// Login with email and password
///
/// Returns an access/refresh token pair. A successful login supersedes
/// every refresh token previously issued to the account.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User successfully logged in", body = TokenInfo),
        (status = 400, description = "Invalid credentials"),
        (status = 501, description = "An error occurred during login"),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let token_info = state.auth.login(&request.email, &request.password).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "User successfully logged in",
        token_info,
    )))
}

/// Refresh the access token
///
/// Exchanges a valid refresh token for a new pair. The presented token is
/// consumed in the process; a second exchange with the same value fails.
#[utoipa::path(
    post,
    path = "/auth/refresh-token",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token successfully refreshed", body = TokenInfo),
        (status = 400, description = "Invalid refresh token or invalid credentials"),
        (status = 501, description = "An error occurred during token refresh"),
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let token_info = state.auth.refresh_token(&request.refresh_token).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "Token successfully refreshed",
        token_info,
    )))
}

/// Get the authenticated caller's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user profile", body = UserInfo),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AppError> {
    let user_info = state.users.user_by_id(user.id).await?;

    Ok(Json(ResponseTemplate::ok(
        200,
        "User retrieved successfully",
        user_info,
    )))
}
