//! Upload session state machine.

use super::error::UploadError;
use super::file::SelectedFile;
use super::response::AltTextResult;

/// Where a session is in its request lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Still idle, but the last selected file was refused before any request.
    Rejected(UploadError),
    Uploading {
        file: SelectedFile,
    },
    Success {
        file: SelectedFile,
        result: AltTextResult,
    },
    Failed {
        file: SelectedFile,
        error: UploadError,
    },
}

impl SessionState {
    /// Short status label: idle, uploading, success or error.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Idle | Self::Rejected(_) => "idle",
            Self::Uploading { .. } => "uploading",
            Self::Success { .. } => "success",
            Self::Failed { .. } => "error",
        }
    }
}

/// Proof that a request was started for a given generation of the session.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    generation: u64,
    file: SelectedFile,
}

impl UploadTicket {
    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// One user's upload session. At most one request is current at a time;
/// completions carrying an older ticket are ignored.
#[derive(Debug, Clone, Default)]
pub struct UploadSession {
    state: SessionState,
    preview: Option<String>,
    generation: u64,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn result(&self) -> Option<&AltTextResult> {
        match &self.state {
            SessionState::Success { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&UploadError> {
        match &self.state {
            SessionState::Rejected(error) | SessionState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, SessionState::Uploading { .. })
    }

    /// Validates `file` and, if it is an image, starts a new request for it.
    ///
    /// Any earlier result, error, or in-flight request is superseded.
    pub fn select(&mut self, file: SelectedFile) -> Result<UploadTicket, UploadError> {
        self.generation += 1;

        if !file.is_image() {
            let error = UploadError::Validation {
                mime: file.mime().to_string(),
            };
            self.preview = None;
            self.state = SessionState::Rejected(error.clone());
            return Err(error);
        }

        self.preview = Some(file.preview_url());
        Ok(self.begin(file))
    }

    /// Starts a new request for the file that last failed.
    pub fn retry(&mut self) -> Option<UploadTicket> {
        let file = match &self.state {
            SessionState::Failed { file, .. } => file.clone(),
            _ => return None,
        };
        self.generation += 1;
        Some(self.begin(file))
    }

    /// Records the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` when the ticket is stale and the outcome was dropped.
    pub fn complete(
        &mut self,
        ticket: &UploadTicket,
        outcome: Result<AltTextResult, UploadError>,
    ) -> bool {
        if ticket.generation != self.generation || !self.is_uploading() {
            return false;
        }

        let file = ticket.file.clone();
        self.state = match outcome {
            Ok(result) => SessionState::Success { file, result },
            Err(error) => SessionState::Failed { file, error },
        };
        true
    }

    /// Clears everything and returns to idle. Pending tickets become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = SessionState::Idle;
        self.preview = None;
    }

    fn begin(&mut self, file: SelectedFile) -> UploadTicket {
        self.state = SessionState::Uploading { file: file.clone() };
        UploadTicket {
            generation: self.generation,
            file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::MalformedResponse;

    fn png() -> SelectedFile {
        SelectedFile::new("cat.png", "image/png", b"png".to_vec())
    }

    fn result() -> AltTextResult {
        AltTextResult {
            alt_text: "a cat".into(),
            long_desc: "a fluffy cat".into(),
        }
    }

    #[test]
    fn test_select_starts_upload_with_preview() {
        let mut session = UploadSession::new();
        let ticket = session.select(png()).unwrap();

        assert_eq!(session.state().status(), "uploading");
        assert_eq!(session.preview(), Some("data:image/png;base64,cG5n"));
        assert_eq!(ticket.file(), &png());
    }

    #[test]
    fn test_non_image_is_rejected_without_ticket() {
        let mut session = UploadSession::new();
        let err = session
            .select(SelectedFile::new("notes.txt", "text/plain", b"hi".to_vec()))
            .unwrap_err();

        assert_eq!(err, UploadError::Validation { mime: "text/plain".into() });
        assert_eq!(session.state().status(), "idle");
        assert_eq!(session.error(), Some(&err));
        assert!(session.preview().is_none());
    }

    #[test]
    fn test_success_then_new_upload_clears_everything() {
        let mut session = UploadSession::new();
        let ticket = session.select(png()).unwrap();
        assert!(session.complete(&ticket, Ok(result())));
        assert_eq!(session.result(), Some(&result()));

        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.preview().is_none());
        assert!(session.result().is_none());
        assert!(session.error().is_none());
    }

    #[test]
    fn test_failure_keeps_file_for_retry() {
        let mut session = UploadSession::new();
        let ticket = session.select(png()).unwrap();
        let error = UploadError::from(MalformedResponse::MissingContent);
        session.complete(&ticket, Err(error.clone()));

        assert_eq!(session.state().status(), "error");
        assert_eq!(session.error(), Some(&error));

        let retry = session.retry().unwrap();
        assert_eq!(retry.file(), &png());
        assert!(session.is_uploading());
        assert!(session.error().is_none());
        assert!(session.preview().is_some());
    }

    #[test]
    fn test_retry_only_from_failed() {
        let mut session = UploadSession::new();
        assert!(session.retry().is_none());

        let ticket = session.select(png()).unwrap();
        assert!(session.retry().is_none());
        session.complete(&ticket, Ok(result()));
        assert!(session.retry().is_none());
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut session = UploadSession::new();
        let first = session.select(png()).unwrap();
        let second = session
            .select(SelectedFile::new("dog.jpg", "image/jpeg", b"jpg".to_vec()))
            .unwrap();

        assert!(!session.complete(&first, Ok(result())));
        assert!(session.is_uploading());

        assert!(session.complete(&second, Ok(result())));
        match session.state() {
            SessionState::Success { file, .. } => assert_eq!(file.name(), "dog.jpg"),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_completion_after_reset_is_ignored() {
        let mut session = UploadSession::new();
        let ticket = session.select(png()).unwrap();
        session.reset();

        assert!(!session.complete(&ticket, Ok(result())));
        assert_eq!(session.state(), &SessionState::Idle);
    }
}
