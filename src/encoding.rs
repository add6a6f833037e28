//! Base64 and `data:` URL helpers.

use std::io::Write;

use base64::engine::general_purpose;
use base64::write::EncoderStringWriter;

/// Bytes fed to the encoder per write.
pub const CHUNK_SIZE: usize = 0x8000;

/// Encodes `bytes` as standard base64, feeding the encoder in fixed-size chunks.
///
/// The streaming encoder carries partial triples across chunk boundaries, so
/// the output is identical to a one-shot encode.
pub fn encode_base64(bytes: &[u8]) -> String {
    let mut encoder = EncoderStringWriter::new(&general_purpose::STANDARD);
    for chunk in bytes.chunks(CHUNK_SIZE) {
        encoder
            .write_all(chunk)
            .expect("writing to a String cannot fail");
    }
    encoder.into_inner()
}

/// Builds `data:<mime>;base64,<payload>`.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    let payload = encode_base64(bytes);
    let mut url = String::with_capacity(payload.len() + mime.len() + 13);
    url.push_str("data:");
    url.push_str(mime);
    url.push_str(";base64,");
    url.push_str(&payload);
    url
}
