//! Authentication middleware and role-based authorization guard
//!
//! Two independent checks run before protected handlers:
//! 1. `auth_middleware` - extracts the bearer token, verifies signature
//!    and expiry, and attaches the resolved user to request extensions.
//! 2. `role_guard` - consults the per-endpoint allowlist map; an endpoint
//!    without an entry admits any authenticated role, an endpoint with an
//!    entry requires membership.

use super::jwt::{validate_token, Claims, JwtError};
use super::models::UserRole;
use crate::audit::{audit_log, AuditEvent};
use crate::response::ResponseTemplate;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Authenticated user information extracted from the access token
///
/// Added to request extensions by `auth_middleware`; handlers extract it
/// with `Extension<AuthenticatedUser>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken(JwtError::InvalidToken))?;
        let role = UserRole::parse(&claims.role).ok_or(AuthError::InvalidToken(JwtError::InvalidToken))?;

        Ok(Self {
            id,
            email: claims.email,
            role,
        })
    }
}

/// Guard-level errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,

    #[error("Invalid Authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingAuthHeader => {
                (StatusCode::UNAUTHORIZED, "Missing Authorization header")
            }
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ),
            AuthError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AuthError::InsufficientPermissions => {
                (StatusCode::FORBIDDEN, "Insufficient permissions")
            }
        };

        let body = ResponseTemplate::<()>::error(status.as_u16(), message);
        (status, axum::Json(body)).into_response()
    }
}

/// Require a valid bearer token and attach the resolved user
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    let claims = match validate_token(&state.config.auth, token) {
        Ok(c) => c,
        Err(e) => {
            audit_log(&AuditEvent::InvalidAccessToken {
                reason: e.to_string(),
            });
            return Err(AuthError::InvalidToken(e));
        }
    };

    let user = AuthenticatedUser::from_claims(claims)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Enforce the per-endpoint role allowlist
///
/// Runs after `auth_middleware`, so a missing extension means the request
/// bypassed authentication entirely and is rejected outright.
pub async fn role_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Some(allowed) = state
        .policy
        .allowed_roles(request.method(), request.uri().path())
    {
        let user = request
            .extensions()
            .get::<AuthenticatedUser>()
            .ok_or(AuthError::MissingAuthHeader)?;

        if !allowed.contains(&user.role) {
            audit_log(&AuditEvent::AccessDenied {
                user_id: user.id,
                email: user.email.clone(),
                path: request.uri().path().to_string(),
                required_roles: allowed.iter().map(|r| r.to_string()).collect(),
            });
            return Err(AuthError::InsufficientPermissions);
        }
    }

    Ok(next.run(request).await)
}

/// Per-endpoint role allowlist
///
/// The explicit counterpart of handler-attached role metadata: a map from
/// (method, path pattern) to the roles admitted there. Endpoints not in
/// the map accept any authenticated role.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    rules: Vec<PolicyRule>,
}

#[derive(Debug, Clone)]
struct PolicyRule {
    method: Method,
    pattern: &'static str,
    roles: &'static [UserRole],
}

impl RoutePolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Restrict an endpoint to the given roles
    pub fn require(
        mut self,
        method: Method,
        pattern: &'static str,
        roles: &'static [UserRole],
    ) -> Self {
        self.rules.push(PolicyRule {
            method,
            pattern,
            roles,
        });
        self
    }

    /// Look up the allowlist for a concrete request path
    pub fn allowed_roles(&self, method: &Method, path: &str) -> Option<&'static [UserRole]> {
        self.rules
            .iter()
            .find(|rule| rule.method == *method && path_matches(rule.pattern, path))
            .map(|rule| rule.roles)
    }
}

/// Segment-wise match; `:name` segments match any single segment
fn path_matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.trim_matches('/').split('/');
    let mut path_segments = path.trim_matches('/').split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) => {
                if !p.starts_with(':') && p != s {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_policy() -> RoutePolicy {
        RoutePolicy::new()
            .require(Method::POST, "/users", &[UserRole::Admin])
            .require(Method::PUT, "/users/:id", &[UserRole::Admin, UserRole::Editor])
            .require(Method::DELETE, "/users/:id", &[UserRole::Admin])
    }

    #[test]
    fn test_path_matches_literal_and_param() {
        assert!(path_matches("/users", "/users"));
        assert!(path_matches("/users/:id", "/users/42"));
        assert!(path_matches("/files/:file_name", "/files/report.pdf"));
        assert!(!path_matches("/users/:id", "/users"));
        assert!(!path_matches("/users", "/users/42"));
        assert!(!path_matches("/users/:id", "/files/42"));
    }

    #[test]
    fn test_unlisted_endpoint_admits_any_role() {
        let policy = sample_policy();
        assert!(policy.allowed_roles(&Method::GET, "/users").is_none());
        assert!(policy.allowed_roles(&Method::GET, "/users/42").is_none());
    }

    #[test]
    fn test_listed_endpoint_returns_allowlist() {
        let policy = sample_policy();

        let create = policy.allowed_roles(&Method::POST, "/users").unwrap();
        assert_eq!(create, &[UserRole::Admin]);

        let update = policy.allowed_roles(&Method::PUT, "/users/42").unwrap();
        assert!(update.contains(&UserRole::Editor));
        assert!(!update.contains(&UserRole::Viewer));
    }

    #[test]
    fn test_method_distinguishes_rules() {
        let policy = sample_policy();

        assert_eq!(
            policy.allowed_roles(&Method::DELETE, "/users/42").unwrap(),
            &[UserRole::Admin]
        );
        // Same path, different method, different rule
        assert_ne!(
            policy.allowed_roles(&Method::PUT, "/users/42").unwrap(),
            policy.allowed_roles(&Method::DELETE, "/users/42").unwrap()
        );
    }

    #[test]
    fn test_from_claims_rejects_malformed_subject() {
        let claims = Claims {
            iss: "keystone-api".to_string(),
            sub: "not-a-uuid".to_string(),
            email: "a@b.com".to_string(),
            role: "admin".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(AuthenticatedUser::from_claims(claims).is_err());

        let claims = Claims {
            iss: "keystone-api".to_string(),
            sub: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            role: "root".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(AuthenticatedUser::from_claims(claims).is_err());
    }
}
