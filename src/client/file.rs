//! Files selected for upload.

use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;

use crate::encoding;

/// A file picked by the user, held in memory so it can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads `path` and detects its MIME type from content, then extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let mime = sniff_mime(path, &bytes);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, mime, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// Local preview as a `data:` URL.
    pub fn preview_url(&self) -> String {
        encoding::data_url(&self.mime, &self.bytes)
    }
}

const OCTET_STREAM: &str = "application/octet-stream";

fn sniff_mime(path: &Path, bytes: &[u8]) -> String {
    let detected = image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .ok()
        .map(mime_for)
        .filter(|mime| *mime != OCTET_STREAM);
    if let Some(mime) = detected {
        return mime.to_string();
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("txt") => "text/plain".to_string(),
        _ => OCTET_STREAM.to_string(),
    }
}

fn mime_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => OCTET_STREAM,
    }
}
