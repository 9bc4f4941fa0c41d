//! API route definitions and the per-endpoint role allowlist
//!
//! Author: hephaex@gmail.com

use crate::auth::{auth_middleware, role_guard, RoutePolicy, UserRole};
use crate::handlers::{auth, files, health, users};
use crate::state::AppState;
use axum::{
    http::Method,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

const ADMIN: &[UserRole] = &[UserRole::Admin];
const ADMIN_EDITOR: &[UserRole] = &[UserRole::Admin, UserRole::Editor];

/// Role allowlist consulted by the guard
///
/// Endpoints without an entry admit any authenticated role. Membership is
/// exact: admin appears wherever it is allowed, never implicitly.
pub fn default_policy() -> RoutePolicy {
    RoutePolicy::new()
        .require(Method::POST, "/users", ADMIN)
        .require(Method::PUT, "/users/:id", ADMIN_EDITOR)
        .require(Method::DELETE, "/users/:id", ADMIN)
        .require(Method::POST, "/files", ADMIN)
        .require(Method::PUT, "/files/:file_name", ADMIN_EDITOR)
        .require(Method::DELETE, "/files/:file_name", ADMIN)
}

/// Create API routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/refresh-token", post(auth::refresh_handler));

    // Protected routes (authentication + role allowlist)
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        // User management
        .route("/users", post(users::create_user_handler))
        .route("/users", get(users::list_users_handler))
        .route("/users/:id", get(users::get_user_handler))
        .route("/users/:id", put(users::update_user_handler))
        .route("/users/:id", delete(users::delete_user_handler))
        // File attachments
        .route("/files", post(files::upload_file_handler))
        .route("/files", get(files::list_files_handler))
        .route("/files/:file_name", put(files::replace_file_handler))
        .route("/files/:file_name", delete(files::delete_file_handler))
        .layer(middleware::from_fn_with_state(state.clone(), role_guard))
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
