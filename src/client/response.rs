//! Extracting the generated alt text from the provider envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::MalformedResponse;

/// Alt text and long description for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AltTextResult {
    pub alt_text: String,
    pub long_desc: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAltText {
    #[serde(default)]
    alt_text: Option<String>,
    #[serde(default)]
    long_desc: Option<String>,
}

const CONTENT_POINTER: &str = "/choices/0/message/content";

/// Reads `choices[0].message.content`, which holds a JSON-encoded
/// `{ "altText": ..., "longDesc": ... }` object.
///
/// Empty strings count as missing.
pub fn parse_provider_response(body: &Value) -> Result<AltTextResult, MalformedResponse> {
    let content = body
        .pointer(CONTENT_POINTER)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(MalformedResponse::MissingContent)?;

    let raw: RawAltText = serde_json::from_str(content)
        .map_err(|e| MalformedResponse::InvalidContent(e.to_string()))?;

    let alt_text = raw.alt_text.filter(|s| !s.is_empty());
    let long_desc = raw.long_desc.filter(|s| !s.is_empty());

    match (alt_text, long_desc) {
        (Some(alt_text), Some(long_desc)) => Ok(AltTextResult {
            alt_text,
            long_desc,
        }),
        (alt_text, long_desc) => {
            let mut missing = Vec::new();
            if alt_text.is_none() {
                missing.push("altText");
            }
            if long_desc.is_none() {
                missing.push("longDesc");
            }
            Err(MalformedResponse::MissingFields { missing })
        }
    }
}
