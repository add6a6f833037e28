//! The edge handler: multipart image in, inference response out.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::Value;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{ConfigError, EdgeConfig};
use crate::encoding;
use crate::error::{EdgeError, Result};
use crate::inference::InferenceProvider;
use crate::page;
use crate::prompt::ModelInput;

/// MIME type assumed when the uploaded part does not declare one.
pub const FALLBACK_MIME: &str = "image/jpeg";

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Clone)]
pub struct AppState {
    config: Arc<EdgeConfig>,
    provider: Arc<dyn InferenceProvider>,
    page: Arc<str>,
}

/// Builds the application router: the edge route plus the upload page.
pub fn router(
    config: EdgeConfig,
    provider: Arc<dyn InferenceProvider>,
) -> std::result::Result<Router, ConfigError> {
    config.validate()?;
    let origin = config.origin_header()?;

    let state = AppState {
        page: page::render(&config.route).into(),
        config: Arc::new(config),
        provider,
    };

    let cors = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            origin,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ));

    let edge = Router::new()
        .route(&state.config.route, any(generate_alt_text))
        .layer(DefaultBodyLimit::max(state.config.body_limit))
        .layer(cors);

    let ui = Router::new().route(&state.config.page_route, get(serve_page));

    Ok(edge
        .merge(ui)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn serve_page(State(state): State<AppState>) -> Html<String> {
    Html(state.page.to_string())
}

async fn generate_alt_text(
    State(state): State<AppState>,
    method: Method,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    if method != Method::POST {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }

    match describe_upload(&state, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            tracing::warn!("alt text generation failed: {err}");
            err.into_response()
        }
    }
}

async fn describe_upload(
    state: &AppState,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Value> {
    let upload = read_image_field(multipart?).await?;

    tracing::info!(
        file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        mime = %upload.mime,
        bytes = upload.bytes.len(),
        "received image upload"
    );

    let data_url = encoding::data_url(&upload.mime, &upload.bytes);
    let input = ModelInput::for_image(&state.config, data_url);

    let start = Instant::now();
    let budget = state.config.inference_timeout;
    let response = tokio::time::timeout(budget, state.provider.run(&state.config.model, &input))
        .await
        .map_err(|_| EdgeError::Timeout(budget))??;

    tracing::info!(
        provider = state.provider.name(),
        model = %state.config.model,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "inference completed"
    );

    Ok(response)
}

struct ImageUpload {
    file_name: Option<String>,
    mime: String,
    bytes: Bytes,
}

async fn read_image_field(mut multipart: Multipart) -> Result<ImageUpload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }

        let mime = field
            .content_type()
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_MIME)
            .to_string();
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;

        return Ok(ImageUpload {
            file_name,
            mime,
            bytes,
        });
    }

    Err(EdgeError::MissingImage)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    pub(crate) const BOUNDARY: &str = "alt-gen-test-boundary";

    /// Records every call and answers with a fixed reply.
    pub(crate) struct RecordingProvider {
        pub calls: Mutex<Vec<(String, ModelInput)>>,
        reply: Value,
        delay: Option<Duration>,
        failure: Option<u16>,
    }

    impl RecordingProvider {
        pub fn replying(reply: Value) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
                delay: None,
                failure: None,
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                failure: Some(status),
                ..Self::replying(Value::Null)
            }
        }

        pub fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::replying(json!({}))
            }
        }
    }

    #[async_trait]
    impl InferenceProvider for RecordingProvider {
        async fn run(&self, model: &str, input: &ModelInput) -> Result<Value> {
            self.calls.lock().push((model.to_string(), input.clone()));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(status) = self.failure {
                return Err(EdgeError::Api {
                    status,
                    message: "upstream exploded".into(),
                });
            }
            Ok(self.reply.clone())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    pub(crate) fn provider_reply(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
        })
    }

    pub(crate) fn multipart_body(
        field: &str,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n")
                .as_bytes(),
        );
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/alt-generator")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn app_with(provider: Arc<RecordingProvider>, config: EdgeConfig) -> Router {
        router(config, provider).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOW_HEADERS);
    }

    #[tokio::test]
    async fn test_non_post_methods_are_rejected_with_cors() {
        for method in ["GET", "PUT", "DELETE", "OPTIONS", "PATCH"] {
            let provider = Arc::new(RecordingProvider::replying(json!({})));
            let app = app_with(provider.clone(), EdgeConfig::default());
            let request = Request::builder()
                .method(method)
                .uri("/alt-generator")
                .body(Body::empty())
                .unwrap();

            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_cors(&response);
            assert!(provider.calls.lock().is_empty());
        }
    }

    #[tokio::test]
    async fn test_png_upload_uses_defaults() {
        let reply = provider_reply(r#"{"altText":"a cat","longDesc":"a fluffy cat"}"#);
        let provider = Arc::new(RecordingProvider::replying(reply.clone()));
        let app = app_with(provider.clone(), EdgeConfig::default());

        let body = multipart_body("image", "cat.png", Some("image/png"), b"\x89PNG fake");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(json_body(response).await, reply);

        let calls = provider.calls.lock();
        assert_eq!(calls.len(), 1);
        let (model, input) = &calls[0];
        assert_eq!(model, crate::config::DEFAULT_MODEL);
        assert_eq!(
            input.system_prompt(),
            Some(crate::config::default_system_prompt("Brazilian Portuguese").as_str())
        );
        assert_eq!(input.temperature, 0.1);
        assert!(!input.stream);
        assert_eq!(
            input.image_url(),
            Some(encoding::data_url("image/png", b"\x89PNG fake").as_str())
        );
    }

    #[tokio::test]
    async fn test_missing_content_type_falls_back_to_jpeg() {
        let provider = Arc::new(RecordingProvider::replying(json!({})));
        let app = app_with(provider.clone(), EdgeConfig::default());

        let body = multipart_body("image", "photo", None, b"raw");
        let response = app.oneshot(upload_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let calls = provider.calls.lock();
        assert!(calls[0].1.image_url().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_configured_model_and_temperature_are_forwarded() {
        let provider = Arc::new(RecordingProvider::replying(json!({})));
        let config = EdgeConfig {
            model: "other-vision-model".into(),
            temperature: 0.6,
            ..EdgeConfig::default()
        };
        let app = app_with(provider.clone(), config);

        let body = multipart_body("image", "a.webp", Some("image/webp"), b"webp");
        app.oneshot(upload_request(body)).await.unwrap();

        let calls = provider.calls.lock();
        assert_eq!(calls[0].0, "other-vision-model");
        assert_eq!(calls[0].1.temperature, 0.6);
    }

    #[tokio::test]
    async fn test_missing_image_field_is_500() {
        let provider = Arc::new(RecordingProvider::replying(json!({})));
        let app = app_with(provider.clone(), EdgeConfig::default());

        let body = multipart_body("file", "cat.png", Some("image/png"), b"png");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("\"image\""));
        assert!(provider.calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_non_multipart_post_is_500() {
        let provider = Arc::new(RecordingProvider::replying(json!({})));
        let app = app_with(provider, EdgeConfig::default());

        let request = Request::builder()
            .method("POST")
            .uri("/alt-generator")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let provider = Arc::new(RecordingProvider::failing(502));
        let app = app_with(provider, EdgeConfig::default());

        let body = multipart_body("image", "cat.png", Some("image/png"), b"png");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "inference API error: 502 - upstream exploded" })
        );
    }

    #[tokio::test]
    async fn test_inference_timeout_is_500() {
        let provider = Arc::new(RecordingProvider::slow(Duration::from_secs(5)));
        let config = EdgeConfig {
            inference_timeout: Duration::from_millis(50),
            ..EdgeConfig::default()
        };
        let app = app_with(provider, config);

        let body = multipart_body("image", "cat.png", Some("image/png"), b"png");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn test_page_embeds_edge_route() {
        let provider = Arc::new(RecordingProvider::replying(json!({})));
        let app = app_with(provider, EdgeConfig::default());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(r#"const API_ENDPOINT = "/alt-generator";"#));
    }
}
