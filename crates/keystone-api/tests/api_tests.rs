//! API Integration Tests
//!
//! These drive the router directly without a running server. Everything
//! here stays short of the database: validation, token verification, and
//! the role allowlist all reject before a query is issued.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use keystone_api::auth::jwt::generate_access_token;
use keystone_api::create_router_for_testing;
use keystone_core::config::AuthConfig;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

/// Helper to create a JSON request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to create an authorized JSON request
///
/// The test router uses the default config, so tokens minted with the
/// default secret verify at the guard.
fn create_authorized_request(
    method: &str,
    uri: &str,
    role: &str,
    body: Option<Value>,
) -> Request<Body> {
    let config = AuthConfig::default();
    let token =
        generate_access_token(&config, Uuid::new_v4(), "tester@example.com", role).unwrap();

    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {token}"));

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let app = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/auth/login",
        Some(json!({"email": "not-an-email", "password": "secret1"})),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_login_rejects_empty_password() {
    let app = create_router_for_testing();

    let request = create_json_request(
        "POST",
        "/auth/login",
        Some(json!({"email": "a@b.com", "password": ""})),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rejects_garbage_token() {
    let app = create_router_for_testing();

    // A token that is not even a JWT fails signature verification before
    // any database access
    let request = create_json_request(
        "POST",
        "/auth/refresh-token",
        Some(json!({"refresh_token": "definitely.not.valid"})),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid token");
}

// =============================================================================
// Authentication Guard Tests
// =============================================================================

#[tokio::test]
async fn test_protected_route_requires_auth_header() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(create_json_request("GET", "/users", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["status"], 401);
}

#[tokio::test]
async fn test_protected_route_rejects_invalid_bearer() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("GET")
        .uri("/users")
        .header("Authorization", "Bearer tampered-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_non_bearer_scheme() {
    let app = create_router_for_testing();

    let request = Request::builder()
        .method("GET")
        .uri("/users")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Role Allowlist Tests
// =============================================================================

#[tokio::test]
async fn test_viewer_cannot_create_users() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "POST",
        "/users",
        "viewer",
        Some(json!({
            "name": "New User",
            "email": "new@example.com",
            "password": "secret1",
            "role": "viewer"
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_editor_cannot_delete_files() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "DELETE",
        "/files/report.pdf?file_type=organization",
        "editor",
        None,
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_passes_role_guard_for_user_creation() {
    let app = create_router_for_testing();

    // Invalid body: the request clears the guard and fails validation,
    // which proves the allowlist admitted the admin role
    let request = create_authorized_request(
        "POST",
        "/users",
        "admin",
        Some(json!({
            "name": "",
            "email": "bad",
            "password": "x",
            "role": "viewer"
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// File Attachment Tests (filesystem only, no database)
// =============================================================================

#[tokio::test]
async fn test_list_files_empty_scope() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "GET",
        &format!("/files?file_type=user&id={}", Uuid::new_v4()),
        "viewer",
        None,
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "No files found");
    assert_eq!(json["data"], json!([]));
}

#[tokio::test]
async fn test_delete_missing_file_is_client_error() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "DELETE",
        "/files/nope.txt?file_type=organization",
        "admin",
        None,
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "File not found: nope.txt");
}

#[tokio::test]
async fn test_upload_rejects_user_file_without_owner() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "POST",
        "/files",
        "admin",
        Some(json!({
            "file_name": "avatar.png",
            "content": "aGVsbG8=",
            "file_type": "user"
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "ID is required for user files");
}

#[tokio::test]
async fn test_upload_rejects_invalid_base64() {
    let app = create_router_for_testing();

    let request = create_authorized_request(
        "POST",
        "/files",
        "admin",
        Some(json!({
            "file_name": "avatar.png",
            "content": "!!not base64!!",
            "file_type": "organization"
        })),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["message"], "Content is not valid base64");
}
