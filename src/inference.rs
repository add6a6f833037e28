//! Inference provider trait and the OpenAI-compatible HTTP implementation.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::config::ProviderConfig;
use crate::error::{truncate_message, EdgeError, Result};
use crate::prompt::ModelInput;

/// A multimodal model that turns a prompt into a JSON response envelope.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Runs `model` on `input` and returns the provider's raw response.
    async fn run(&self, model: &str, input: &ModelInput) -> Result<Value>;

    /// Name of this provider for display.
    fn name(&self) -> &str;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    #[serde(flatten)]
    input: &'a ModelInput,
}

/// Builder for [`OpenAiCompatibleProvider`].
#[derive(Debug, Clone, Default)]
pub struct OpenAiCompatibleProviderBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl OpenAiCompatibleProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root, e.g. `http://localhost:8000/v1`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a bearer token. Local servers usually need none.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            base_url: Some(config.base_url.clone()),
            api_key: config.api_key.clone(),
        }
    }

    pub fn build(self) -> OpenAiCompatibleProvider {
        let base_url = self
            .base_url
            .unwrap_or_else(|| crate::config::DEFAULT_INFERENCE_BASE_URL.to_string());
        OpenAiCompatibleProvider {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: self.api_key,
        }
    }
}

/// Provider speaking the `/chat/completions` protocol.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    pub fn builder() -> OpenAiCompatibleProviderBuilder {
        OpenAiCompatibleProviderBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceProvider for OpenAiCompatibleProvider {
    async fn run(&self, model: &str, input: &ModelInput) -> Result<Value> {
        let start = Instant::now();
        let body = ChatCompletionRequest { model, input };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(endpoint = %self.endpoint, model, "sending inference request");
        let response = request.send().await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "inference response received"
        );

        if !status.is_success() {
            return Err(EdgeError::Api {
                status: status.as_u16(),
                message: truncate_message(&text, 500),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn name(&self) -> &str {
        "OpenAI-compatible chat completions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeConfig;

    #[test]
    fn test_endpoint_joins_base_url() {
        let provider = OpenAiCompatibleProvider::builder()
            .base_url("http://example.test/v1/")
            .build();
        assert_eq!(provider.endpoint(), "http://example.test/v1/chat/completions");

        let provider = OpenAiCompatibleProvider::builder().build();
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_body_flattens_input() {
        let input = ModelInput::for_image(&EdgeConfig::default(), "data:image/png;base64,".into());
        let body = ChatCompletionRequest {
            model: "vision-model",
            input: &input,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "vision-model");
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_api_error() {
        use axum::{http::StatusCode, routing::post, Router};

        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model is loading") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let provider = OpenAiCompatibleProvider::builder()
            .base_url(format!("http://{addr}/v1"))
            .build();
        let input = ModelInput::for_image(&EdgeConfig::default(), "data:x".into());
        let err = provider.run("m", &input).await.unwrap_err();
        match err {
            EdgeError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model is loading");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
