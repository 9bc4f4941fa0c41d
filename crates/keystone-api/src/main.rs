//! Keystone API Server
//!
//! Author: hephaex@gmail.com

use keystone_api::{create_router, state::AppState};
use keystone_core::config::AppConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keystone_api=debug,tower_http=debug".into()),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env().unwrap_or_default();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // Connect and migrate
    let pool = keystone_api::db::connect(&config.database).await?;

    // Wire application state
    let state = Arc::new(AppState::new(config, pool));

    // Seed the default admin when the users table is empty
    let admin_password = state.config.auth.default_admin_password.clone();
    if let Err(e) = state.users.seed_default_admin(&admin_password).await {
        tracing::error!("Failed to seed default admin user: {e}");
    }

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Keystone API server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
