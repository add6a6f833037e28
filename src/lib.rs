//! AI alt-text generator.
//!
//! An axum server exposes an edge route that takes a multipart image upload,
//! wraps it in a multimodal prompt, and returns the inference provider's raw
//! response. The [`client`] module is the typed counterpart: it uploads an
//! image, parses the nested `choices[0].message.content` JSON into an
//! [`client::AltTextResult`], and tracks the request in a small state machine.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ai_alt_generator::{edge, EdgeConfig, OpenAiCompatibleProvider, ProviderConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EdgeConfig::from_env()?;
//!     let provider = OpenAiCompatibleProvider::builder()
//!         .base_url(ProviderConfig::from_env().base_url)
//!         .build();
//!     let addr = config.addr;
//!     let app = edge::router(config, Arc::new(provider))?;
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod edge;
pub mod encoding;
mod error;
pub mod inference;
mod page;
pub mod prompt;

pub use config::{ConfigError, EdgeConfig, ProviderConfig};
pub use error::{EdgeError, Result};
pub use inference::{InferenceProvider, OpenAiCompatibleProvider, OpenAiCompatibleProviderBuilder};
pub use prompt::{ChatMessage, ContentPart, ModelInput};
