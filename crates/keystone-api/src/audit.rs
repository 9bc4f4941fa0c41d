//! Security audit logging
//!
//! Structured records for authentication and authorization events, logged
//! at INFO under the `audit` target so they can be filtered and routed to
//! monitoring separately from application logs.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Successful user login
    LoginSuccess { user_id: Uuid, email: String },

    /// Failed login attempt
    ///
    /// Carries only the attempted email and a coarse reason - the audit
    /// trail must not leak which credential stage failed either.
    LoginFailure { email: String, reason: String },

    /// Successful refresh-token rotation
    TokenRefresh { user_id: Uuid, email: String },

    /// Failed refresh attempt
    TokenRefreshFailure { reason: String },

    /// Rejected access token at the guard
    InvalidAccessToken { reason: String },

    /// Role allowlist rejection
    AccessDenied {
        user_id: Uuid,
        email: String,
        path: String,
        required_roles: Vec<String>,
    },

    /// Account created through the users API or the seeder
    UserCreated { user_id: Uuid, email: String },

    /// Account soft-deleted
    UserDeleted { user_id: Uuid },

    /// File attachment stored or replaced
    FileStored { file_name: String, scope: String },

    /// File attachment removed
    FileDeleted { file_name: String, scope: String },
}

/// Emit an audit event
///
/// Serialization failure falls back to the Debug rendering; an audit
/// record is never silently dropped.
pub fn audit_log(event: &AuditEvent) {
    match serde_json::to_string(event) {
        Ok(json) => info!(target: "audit", event = %json),
        Err(_) => info!(target: "audit", event = ?event),
    }
}
