//! Server and provider configuration, loaded from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;

pub const DEFAULT_MODEL: &str = "qwen-qwen25-vl-3b-instruct-awq";
pub const DEFAULT_LANGUAGE: &str = "Brazilian Portuguese";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_ROUTE: &str = "/alt-generator";
pub const DEFAULT_PAGE_ROUTE: &str = "/";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_INFERENCE_BASE_URL: &str = "http://localhost:8000/v1";

/// Errors raised while assembling configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} is not a valid socket address: {value:?}")]
    InvalidAddr { key: &'static str, value: String },

    #[error("allowed origin {0:?} is not a valid header value")]
    InvalidOrigin(String),

    #[error("route {0:?} must start with '/'")]
    InvalidRoute(String),

    #[error("edge route and page route are both {0:?}")]
    RouteConflict(String),
}

/// Everything the edge handler needs, passed explicitly into the router.
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f64,
    pub language: String,
    pub route: String,
    pub page_route: String,
    pub allowed_origin: String,
    pub body_limit: usize,
    pub inference_timeout: Duration,
    pub addr: SocketAddr,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: default_system_prompt(DEFAULT_LANGUAGE),
            temperature: DEFAULT_TEMPERATURE,
            language: DEFAULT_LANGUAGE.to_string(),
            route: DEFAULT_ROUTE.to_string(),
            page_route: DEFAULT_PAGE_ROUTE.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl EdgeConfig {
    /// Reads `ALT_GEN_*` variables, falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EdgeConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let language = get("ALT_GEN_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let system_prompt =
            get("ALT_GEN_SYSTEM_PROMPT").unwrap_or_else(|| default_system_prompt(&language));

        let temperature = match get("ALT_GEN_TEMPERATURE") {
            Some(raw) => parse_number("ALT_GEN_TEMPERATURE", &raw)?,
            None => DEFAULT_TEMPERATURE,
        };
        let body_limit = match get("ALT_GEN_BODY_LIMIT") {
            Some(raw) => parse_number("ALT_GEN_BODY_LIMIT", &raw)?,
            None => DEFAULT_BODY_LIMIT,
        };
        let inference_timeout = match get("ALT_GEN_INFERENCE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number("ALT_GEN_INFERENCE_TIMEOUT_SECS", &raw)?),
            None => DEFAULT_INFERENCE_TIMEOUT,
        };
        let addr_raw = get("ALT_GEN_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr_raw.parse().map_err(|_| ConfigError::InvalidAddr {
            key: "ALT_GEN_ADDR",
            value: addr_raw.clone(),
        })?;

        let config = Self {
            model: get("ALT_GEN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            system_prompt,
            temperature,
            language,
            route: get("ALT_GEN_ROUTE").unwrap_or_else(|| DEFAULT_ROUTE.to_string()),
            page_route: get("ALT_GEN_PAGE_ROUTE").unwrap_or_else(|| DEFAULT_PAGE_ROUTE.to_string()),
            allowed_origin: get("ALT_GEN_ALLOWED_ORIGIN")
                .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
            body_limit,
            inference_timeout,
            addr,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the values the router depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for route in [&self.route, &self.page_route] {
            if !route.starts_with('/') {
                return Err(ConfigError::InvalidRoute(route.clone()));
            }
        }
        if self.route == self.page_route {
            return Err(ConfigError::RouteConflict(self.route.clone()));
        }
        self.origin_header()?;
        Ok(())
    }

    pub fn origin_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.allowed_origin)
            .map_err(|_| ConfigError::InvalidOrigin(self.allowed_origin.clone()))
    }

    /// Instruction sent alongside the image in the user message.
    pub fn user_instruction(&self) -> String {
        format!(
            "Analyze the attached image and return a single JSON object with keys \"altText\" and \"longDesc\" in {}. Return only the JSON object.",
            self.language
        )
    }
}

pub fn default_system_prompt(language: &str) -> String {
    format!(
        "You are an assistant that analyzes images and produces concise, accurate, SEO-optimized alt text in {language}."
    )
}

/// Where the inference provider lives and how to authenticate with it.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            base_url: get("INFERENCE_BASE_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_BASE_URL.to_string()),
            api_key: get("INFERENCE_API_KEY"),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: raw.to_string(),
    })
}
