//! Response generation port and implementations.
//!
//! The ingest workflow asks a [`ResponseGenerator`] for a reply before a
//! prompt is stored. [`SimulatedResponder`] is deterministic and offline;
//! [`ApiResponder`] calls an OpenAI-compatible chat-completions endpoint.

mod api;
mod simulated;

pub use api::{ApiResponder, ApiResponderConfig};
pub use simulated::SimulatedResponder;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use vault_types::{ResponderProvider, ResponderSettings};

/// Error type for response generation.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Empty prompt")]
    EmptyPrompt,
}

/// Pluggable response generator.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a textual response for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, ResponseError>;
}

/// Build the responder selected by `settings.provider`.
pub fn from_settings(
    settings: &ResponderSettings,
) -> Result<Arc<dyn ResponseGenerator>, ResponseError> {
    match settings.provider {
        ResponderProvider::Simulated => Ok(Arc::new(SimulatedResponder::new())),
        ResponderProvider::OpenAi => {
            let api_key = settings
                .api_key
                .clone()
                .ok_or_else(|| ResponseError::ConfigError("api_key is required".to_string()))?;
            let mut config = ApiResponderConfig::openai(api_key, &settings.model);
            if let Some(base_url) = &settings.api_base_url {
                config.base_url = base_url.trim_end_matches('/').to_string();
            }
            Ok(Arc::new(ApiResponder::new(config)?))
        }
    }
}
