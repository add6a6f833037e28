//! Typed upload client for the edge handler.
//!
//! [`UploadSession`] is the state machine, [`Uploader`] performs one request,
//! and [`UploadController`] ties them together with cancellation and notices.

mod controller;
mod error;
mod file;
mod response;
mod session;
mod snippet;
mod uploader;

pub use controller::{Notice, NoticeLevel, UploadController};
pub use error::{MalformedResponse, UploadError, UploadErrorKind};
pub use file::SelectedFile;
pub use response::{parse_provider_response, AltTextResult};
pub use session::{SessionState, UploadSession, UploadTicket};
pub use snippet::{escape_html, render_snippet};
pub use uploader::{Uploader, UploaderBuilder, DEFAULT_ENDPOINT, MIN_DISPLAY};
