//! Client-side error kinds.

use std::time::Duration;

/// Why an upload did not produce a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UploadError {
    /// Selected file is not an image.
    #[error("please select a valid image file (got {mime:?})")]
    Validation { mime: String },

    /// The edge handler could not be reached.
    #[error("could not reach the alt-text service: {0}")]
    Transport(String),

    /// The request exceeded its time budget.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The edge handler answered with a non-2xx status.
    #[error("HTTP error {status}: {reason}")]
    UpstreamStatus { status: u16, reason: String },

    /// The body did not have the expected shape.
    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponse),
}

/// Ways a provider response can fail to yield an [`AltTextResult`](super::AltTextResult).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedResponse {
    #[error("response is not valid JSON: {0}")]
    InvalidBody(String),

    #[error("response does not contain the expected content field (choices[0].message.content)")]
    MissingContent,

    #[error("content is not a valid JSON object: {0}")]
    InvalidContent(String),

    #[error("response is missing {}", .missing.join(" and "))]
    MissingFields { missing: Vec<&'static str> },
}

/// Coarse classification for branching in UIs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    Validation,
    Transport,
    UpstreamStatus,
    MalformedResponse,
}

impl UploadError {
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            Self::Validation { .. } => UploadErrorKind::Validation,
            Self::Transport(_) | Self::Timeout(_) => UploadErrorKind::Transport,
            Self::UpstreamStatus { .. } => UploadErrorKind::UpstreamStatus,
            Self::MalformedResponse(_) => UploadErrorKind::MalformedResponse,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            MalformedResponse::InvalidBody(err.to_string()).into()
        } else {
            Self::Transport(err.to_string())
        }
    }
}
