//! One upload round-trip against the edge handler.

use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::error::{MalformedResponse, UploadError};
use super::file::SelectedFile;
use super::response::{parse_provider_response, AltTextResult};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/alt-generator";

/// Shortest time a successful request is shown as in progress, measured from
/// the start of the request. Failures are reported without delay.
pub const MIN_DISPLAY: Duration = Duration::from_millis(300);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Builder for [`Uploader`].
#[derive(Debug, Clone)]
pub struct UploaderBuilder {
    endpoint: String,
    min_display: Duration,
    timeout: Duration,
}

impl Default for UploaderBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            min_display: MIN_DISPLAY,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl UploaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = url.into();
        self
    }

    pub fn min_display(mut self, min_display: Duration) -> Self {
        self.min_display = min_display;
        self
    }

    /// Overall budget for a single request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Uploader, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(Uploader {
            client,
            endpoint: self.endpoint,
            min_display: self.min_display,
            timeout: self.timeout,
        })
    }
}

/// Posts an image to the edge handler and parses the result.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: reqwest::Client,
    endpoint: String,
    min_display: Duration,
    timeout: Duration,
}

impl Uploader {
    pub fn builder() -> UploaderBuilder {
        UploaderBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn upload(&self, file: &SelectedFile) -> Result<AltTextResult, UploadError> {
        let start = Instant::now();

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime())
            .map_err(|_| UploadError::Validation {
                mime: file.mime().to_string(),
            })?;
        let form = Form::new().part("image", part);

        tracing::debug!(endpoint = %self.endpoint, file = file.name(), "uploading image");
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::from_reqwest(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UpstreamStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| UploadError::from_reqwest(e, self.timeout))?;
        let body: Value = serde_json::from_str(&text)
            .map_err(|e| MalformedResponse::InvalidBody(e.to_string()))?;
        let result = parse_provider_response(&body)?;

        let elapsed = start.elapsed();
        if elapsed < self.min_display {
            tokio::time::sleep(self.min_display - elapsed).await;
        }

        Ok(result)
    }
}
