//! Drives an [`UploadSession`] with real requests.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use super::error::UploadError;
use super::file::SelectedFile;
use super::session::{UploadSession, UploadTicket};
use super::uploader::Uploader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn success() -> Self {
        Self {
            level: NoticeLevel::Success,
            title: "Success!".into(),
            description: "Alt text and description generated.".into(),
        }
    }

    fn error(error: &UploadError) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: "Error".into(),
            description: error.to_string(),
        }
    }
}

/// Owns one session and at most one in-flight upload task.
///
/// Starting a new upload aborts the previous task; its ticket is stale by
/// then, so even a completion that races the abort is dropped.
pub struct UploadController {
    session: Arc<Mutex<UploadSession>>,
    uploader: Arc<Uploader>,
    notices: mpsc::UnboundedSender<Notice>,
    in_flight: Option<AbortHandle>,
}

impl UploadController {
    pub fn new(uploader: Uploader) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            session: Arc::new(Mutex::new(UploadSession::new())),
            uploader: Arc::new(uploader),
            notices: tx,
            in_flight: None,
        };
        (controller, rx)
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> UploadSession {
        self.session.lock().clone()
    }

    /// Selects a file. Returns the upload task, or `None` if the file was
    /// rejected, in which case no request is made.
    pub fn select(&mut self, file: SelectedFile) -> Option<JoinHandle<()>> {
        let ticket = self.session.lock().select(file);
        match ticket {
            Ok(ticket) => Some(self.spawn(ticket)),
            Err(error) => {
                self.cancel_in_flight();
                tracing::info!("rejected selection: {error}");
                None
            }
        }
    }

    /// Re-uploads the retained file after a failure.
    pub fn retry(&mut self) -> Option<JoinHandle<()>> {
        let ticket = self.session.lock().retry()?;
        Some(self.spawn(ticket))
    }

    /// Abandons any request and clears the session.
    pub fn new_upload(&mut self) {
        self.cancel_in_flight();
        self.session.lock().reset();
    }

    fn cancel_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn spawn(&mut self, ticket: UploadTicket) -> JoinHandle<()> {
        self.cancel_in_flight();

        let session = Arc::clone(&self.session);
        let uploader = Arc::clone(&self.uploader);
        let notices = self.notices.clone();

        let handle = tokio::spawn(async move {
            let outcome = uploader.upload(ticket.file()).await;

            let notice = match &outcome {
                Ok(_) => Notice::success(),
                Err(error) => {
                    tracing::warn!(file = ticket.file().name(), "upload failed: {error}");
                    Notice::error(error)
                }
            };

            if session.lock().complete(&ticket, outcome) {
                let _ = notices.send(notice);
            } else {
                tracing::debug!(generation = ticket.generation(), "dropping stale upload result");
            }
        });

        self.in_flight = Some(handle.abort_handle());
        handle
    }
}
