//! Error types for the edge handler.

use std::time::Duration;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors that can occur while turning an upload into an inference response.
#[derive(Debug, thiserror::Error)]
pub enum EdgeError {
    /// Body is not a readable multipart form.
    #[error("invalid form data: {0}")]
    Form(#[from] MultipartRejection),

    /// A multipart field could not be read.
    #[error("failed to read form field: {0}")]
    Field(#[from] MultipartError),

    /// No field named `image` in the form.
    #[error("form data has no \"image\" file field")]
    MissingImage,

    /// Inference provider returned an error response.
    #[error("inference API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Network or HTTP error reaching the provider.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider body was not JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Inference call exceeded its time budget.
    #[error("inference timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias for edge operations.
pub type Result<T> = std::result::Result<T, EdgeError>;

impl IntoResponse for EdgeError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Truncates provider error bodies before they are echoed back.
pub(crate) fn truncate_message(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
