use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::application::CompletionService;
use crate::domain::{ContentBlock, RequestError, Turn};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";
/// Upper bound on generated tokens per reply. Not configurable.
pub const MAX_TOKENS: u32 = 1024;
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API request payload.
#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Turn],
}

/// The part of a Messages API response the session needs.
#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

/// `{"type": "error", "error": {"type": "...", "message": "..."}}`
#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// HTTP client for the Anthropic Messages API (and compatible endpoints).
///
/// Every call posts the whole transcript with a fixed model and
/// [`MAX_TOKENS`], waits for the complete reply and turns it into one
/// assistant [`Turn`]. There is no retry, no streaming and no client-side
/// timeout; cancellation is left to the caller.
///
/// Configuration comes from the environment (see [`AnthropicClient::from_env`]):
///
/// ```text
/// ANTHROPIC_API_KEY=sk-ant-...
/// ANTHROPIC_BASE_URL=https://api.anthropic.com
/// ANTHROPIC_MODEL=claude-3-7-sonnet-latest
/// ```
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    /// Full endpoint URL (base + MESSAGES_PATH).
    url: String,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base: String = base_url.into();
        let url = format!("{}{}", base.trim_end_matches('/'), MESSAGES_PATH);
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            url,
        }
    }

    /// Construct from environment variables:
    ///
    /// | Variable             | Default                     |
    /// |----------------------|-----------------------------|
    /// | `ANTHROPIC_API_KEY`  | `""` (empty)                |
    /// | `ANTHROPIC_BASE_URL` | `https://api.anthropic.com` |
    /// | `ANTHROPIC_MODEL`    | `claude-3-7-sonnet-latest`  |
    ///
    /// A missing key is not checked here; the service rejects the first
    /// request with an authentication error instead.
    pub fn from_env() -> Self {
        let key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        let base =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        if key.is_empty() {
            warn!("ANTHROPIC_API_KEY is not set; requests will be rejected by the service");
        }
        Self::new(key, model, base)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Map a non-success response body to a [`RequestError::Service`],
    /// preferring the API's own error type and message when the body has them.
    fn service_error(status: u16, body: &str) -> RequestError {
        match serde_json::from_str::<ApiErrorEnvelope>(body) {
            Ok(envelope) => {
                RequestError::service(status, envelope.error.kind, envelope.error.message)
            }
            Err(_) => RequestError::service(status, "http_error", body.trim()),
        }
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, transcript: &[Turn]) -> Result<Turn, RequestError> {
        let request = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: transcript,
        };

        debug!(
            "AnthropicClient: posting {} messages to {} (model {})",
            transcript.len(),
            self.url,
            self.model
        );

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| RequestError::transport(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RequestError::transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            warn!("AnthropicClient: API returned {status}: {body}");
            return Err(Self::service_error(status.as_u16(), &body));
        }

        let api_response: ApiResponse = serde_json::from_str(&body)
            .map_err(|e| RequestError::decode(format!("failed to parse response: {e}")))?;

        debug!(
            "AnthropicClient: {} content blocks, stop_reason={}",
            api_response.content.len(),
            api_response.stop_reason.as_deref().unwrap_or("none")
        );

        Ok(Turn::assistant(api_response.content))
    }
}
