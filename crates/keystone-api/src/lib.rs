//! Keystone API - user management and authentication server
//!
//! Layered HTTP service: handlers delegate to services, services drive the
//! repositories inside units of work, repositories own the SQL.

pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod files;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod users;

use axum::http::HeaderValue;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_handler,
        handlers::auth::login_handler,
        handlers::auth::refresh_handler,
        handlers::auth::me_handler,
        handlers::users::create_user_handler,
        handlers::users::list_users_handler,
        handlers::users::get_user_handler,
        handlers::users::update_user_handler,
        handlers::users::delete_user_handler,
        handlers::files::upload_file_handler,
        handlers::files::list_files_handler,
        handlers::files::replace_file_handler,
        handlers::files::delete_file_handler,
    ),
    components(schemas(
        auth::service::LoginRequest,
        auth::service::RefreshTokenRequest,
        auth::models::TokenInfo,
        auth::models::UserRole,
        users::repository::UserInfo,
        users::service::CreateUserRequest,
        users::service::UpdateUserRequest,
        users::service::UserPage,
        files::storage::FileKind,
        files::storage::StoredFile,
        handlers::files::UploadFileRequest,
        handlers::files::ReplaceFileRequest,
    )),
    tags(
        (name = "auth", description = "Authentication and session lifecycle"),
        (name = "users", description = "User account management"),
        (name = "files", description = "File attachments"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Build the application router with middleware and documentation
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = routes::api_routes(state.clone());

    if state.config.server.cors_enabled && !state.config.server.cors_origins.is_empty() {
        let origins: Vec<HeaderValue> = state
            .config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        router = router.layer(CorsLayer::new().allow_origin(AllowOrigin::list(origins)));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Router over a lazily connected pool, for tests that never reach the
/// database
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    use keystone_core::config::AppConfig;
    use sqlx::postgres::PgPoolOptions;

    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool construction cannot fail on a well-formed URL");

    let state = Arc::new(AppState::new(config, pool));
    create_router(state)
}
