//! Data models for authentication and authorization
//!
//! Defines the role enumeration, the persisted refresh-token row, and the
//! token triple returned by login/refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role enum
///
/// Defines the access level for a user in the system:
/// - Admin: full access including user management and file administration
/// - Editor: can update users and replace files
/// - Viewer: read-only access
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    /// Convert role to its stored string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Viewer => "viewer",
        }
    }

    /// Parse role from its stored string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token triple returned by login and refresh
///
/// `expires_in` is the configured access-token lifetime suffixed with its
/// unit, e.g. `"3600s"`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: String,
}

/// Persisted refresh-token row
///
/// The `token` column holds a SHA-256 digest of the issued JWT, never the
/// raw value. Rows are deactivated when superseded, not deleted; expiry is
/// enforced at validation time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Check if the stored expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// A row is usable only while active and unexpired
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>, is_active: bool) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id: Uuid::new_v4(),
            token: "digest".to_string(),
            user_id: Uuid::new_v4(),
            expires_at,
            is_active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("EDITOR"), Some(UserRole::Editor));
        assert_eq!(UserRole::parse("viewer"), Some(UserRole::Viewer));
        assert_eq!(UserRole::parse("superuser"), None);
    }

    #[test]
    fn test_active_unexpired_row_is_usable() {
        let row = record(Utc::now() + Duration::days(7), true);
        assert!(row.is_usable());
        assert!(!row.is_expired());
    }

    #[test]
    fn test_expired_row_is_unusable_even_when_active() {
        let row = record(Utc::now() - Duration::seconds(1), true);
        assert!(row.is_expired());
        assert!(!row.is_usable());
    }

    #[test]
    fn test_inactive_row_is_unusable() {
        let row = record(Utc::now() + Duration::days(7), false);
        assert!(!row.is_usable());
    }
}
