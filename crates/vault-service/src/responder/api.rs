//! Responder backed by an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{ResponseError, ResponseGenerator};

/// Configuration for [`ApiResponder`].
#[derive(Debug, Clone)]
pub struct ApiResponderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,

    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Maximum attempts, including the first
    pub max_retries: u32,

    /// Upper bound on total time spent retrying
    pub max_elapsed: Duration,
}

impl ApiResponderConfig {
    /// Config for the public OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
            max_retries: 3,
            max_elapsed: Duration::from_secs(120),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Calls the configured endpoint, retrying failures with exponential backoff.
pub struct ApiResponder {
    client: Client,
    config: ApiResponderConfig,
}

impl ApiResponder {
    pub fn new(config: ApiResponderConfig) -> Result<Self, ResponseError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ResponseError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn call_api(&self, prompt: &str) -> Result<String, ResponseError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.config.max_elapsed),
            ..Default::default()
        };

        let mut attempts = 0;
        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling response API");

            match self.make_request(prompt).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempts >= self.config.max_retries {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "API call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    async fn make_request(&self, prompt: &str) -> Result<String, ResponseError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ResponseError::ApiError(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResponseError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResponseError::ApiError(format!("HTTP {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ResponseError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ResponseError::ParseError("No choices in response".to_string()))
    }
}

#[async_trait]
impl ResponseGenerator for ApiResponder {
    async fn generate(&self, prompt: &str) -> Result<String, ResponseError> {
        if prompt.trim().is_empty() {
            return Err(ResponseError::EmptyPrompt);
        }
        self.call_api(prompt).await
    }
}
