//! Application state management
//!
//! All services are wired once at process start from the configuration
//! and the connection pool - plain constructor injection, no globals.
//!
//! Author: hephaex@gmail.com

use crate::auth::repository::RefreshTokenRepository;
use crate::auth::{AuthService, RoutePolicy};
use crate::db::UnitOfWork;
use crate::files::FileStorage;
use crate::users::{UserRepository, UsersService};
use keystone_core::config::AppConfig;
use sqlx::PgPool;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Authentication service
    pub auth: AuthService,
    /// User management service
    pub users: UsersService,
    /// File attachment store
    pub files: FileStorage,
    /// Per-endpoint role allowlist
    pub policy: RoutePolicy,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Wire services from configuration and a ready pool
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let uow = UnitOfWork::new(pool.clone());
        let user_repo = UserRepository::new(pool);
        let token_repo = RefreshTokenRepository::new();

        let auth = AuthService::new(
            uow.clone(),
            user_repo.clone(),
            token_repo,
            config.auth.clone(),
        );
        let users = UsersService::new(uow, user_repo);
        let files = FileStorage::new(
            config.storage.upload_dir.clone(),
            config.storage.base_url.clone(),
        );
        let policy = crate::routes::default_policy();

        Self {
            config,
            auth,
            users,
            files,
            policy,
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
