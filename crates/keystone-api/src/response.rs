//! Response envelope shared by all controllers
//!
//! Every endpoint answers with `{status, message, data}`; unexpected
//! failures additionally attach an `error` detail string that is meant for
//! diagnostics, not for display.

use serde::{Deserialize, Serialize};

/// Uniform response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTemplate<T> {
    /// Status code mirrored into the body
    pub status: u16,

    /// Human-readable message
    pub message: String,

    /// Response payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Error detail for unexpected failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ResponseTemplate<T> {
    pub fn ok(status: u16, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    pub fn error_with_detail(
        status: u16,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            error: Some(detail.into()),
        }
    }
}
