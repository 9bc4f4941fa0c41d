//! File attachment API handlers
//!
//! Attachments are scoped per user or per organization. Content travels
//! base64-encoded in JSON bodies; scope and owner arrive as query
//! parameters on the read/delete side.
//!
//! Author: hephaex@gmail.com

use crate::audit::{audit_log, AuditEvent};
use crate::error::AppError;
use crate::files::{FileKind, StoredFile};
use crate::response::ResponseTemplate;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Upload request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct UploadFileRequest {
    /// Original file name; only its extension is kept
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,

    /// Base64 encoded file content
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Attachment scope (user or organization)
    pub file_type: FileKind,

    /// Owner user ID (required for user files)
    pub owner_id: Option<Uuid>,
}

/// Replace request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ReplaceFileRequest {
    /// Base64 encoded file content
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub file_type: FileKind,

    pub owner_id: Option<Uuid>,
}

/// Scope selector for list/delete
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct FileScopeQuery {
    /// Attachment scope (user or organization)
    pub file_type: FileKind,

    /// Owner user ID (required for user files)
    pub id: Option<Uuid>,
}

fn decode_content(content: &str) -> Result<Vec<u8>, AppError> {
    base64::engine::general_purpose::STANDARD
        .decode(content)
        .map_err(|_| AppError::BadRequest("Content is not valid base64".to_string()))
}

/// Upload a file for a user or organization (admin only)
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body = UploadFileRequest,
    responses(
        (status = 201, description = "File uploaded successfully", body = StoredFile),
        (status = 400, description = "Invalid request or missing parameters"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_file_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadFileRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let content = decode_content(&request.content)?;
    let stored = state
        .files
        .store(request.file_type, request.owner_id, &request.file_name, &content)
        .await?;

    audit_log(&AuditEvent::FileStored {
        file_name: stored.file_name.clone(),
        scope: request.file_type.as_str().to_string(),
    });

    Ok((
        StatusCode::CREATED,
        Json(ResponseTemplate::ok(201, "File uploaded successfully", stored)),
    ))
}

/// List uploaded files for a user or organization
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(FileScopeQuery),
    responses(
        (status = 200, description = "List of uploaded files", body = [StoredFile]),
        (status = 400, description = "Invalid request or missing parameters"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_files_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let files = state.files.list(query.file_type, query.id).await?;

    let message = if files.is_empty() {
        "No files found"
    } else {
        "Files listed successfully"
    };

    Ok(Json(ResponseTemplate::ok(200, message, files)))
}

/// Replace a file's content in place (admin or editor)
#[utoipa::path(
    put,
    path = "/files/{file_name}",
    tag = "files",
    params(("file_name" = String, Path, description = "Stored file name")),
    request_body = ReplaceFileRequest,
    responses(
        (status = 200, description = "File updated successfully", body = StoredFile),
        (status = 400, description = "Invalid request or file not found"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_file_handler(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    Json(request): Json<ReplaceFileRequest>,
) -> Result<impl IntoResponse, AppError> {
    request.validate()?;

    let content = decode_content(&request.content)?;
    let stored = state
        .files
        .replace(request.file_type, request.owner_id, &file_name, &content)
        .await?;

    audit_log(&AuditEvent::FileStored {
        file_name: stored.file_name.clone(),
        scope: request.file_type.as_str().to_string(),
    });

    Ok(Json(ResponseTemplate::ok(
        200,
        "File updated successfully",
        stored,
    )))
}

/// Delete a file (admin only)
#[utoipa::path(
    delete,
    path = "/files/{file_name}",
    tag = "files",
    params(
        ("file_name" = String, Path, description = "Stored file name"),
        FileScopeQuery,
    ),
    responses(
        (status = 200, description = "File deleted successfully"),
        (status = 400, description = "Invalid request or file not found"),
        (status = 403, description = "Insufficient permissions"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_file_handler(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
    Query(query): Query<FileScopeQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .files
        .delete(query.file_type, query.id, &file_name)
        .await?;

    audit_log(&AuditEvent::FileDeleted {
        file_name: file_name.clone(),
        scope: query.file_type.as_str().to_string(),
    });

    Ok(Json(ResponseTemplate::ok(
        200,
        "File deleted successfully",
        file_name,
    )))
}
