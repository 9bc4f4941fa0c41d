//! Keystone Core - shared configuration and error types
//!
//! This crate defines the pieces shared by the Keystone service binaries:
//! - Configuration management (env + TOML file)
//! - Common error types

pub mod config;

pub use config::{AppConfig, AuthConfig, ConfigError, DatabaseConfig, ServerConfig, StorageConfig};

use thiserror::Error;

/// Core error types for Keystone operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
