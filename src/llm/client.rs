//! Chat-completion client for OpenAI-compatible providers

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::streaming::StreamingResponse;
use crate::config::AppConfig;
use crate::errors::ProfRagError;
use crate::errors::Result;
use crate::models::ChatMessage;

/// Client for streamed chat completions
pub struct ChatCompletionClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

impl ChatCompletionClient {
    /// Create a new completion client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        model: String,
        api_key: String,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProfRagError::HttpError(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        })
    }

    /// Build the client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.llm_endpoint().to_string(),
            config.llm_model().to_string(),
            config.credentials.openai_api_key.clone(),
            Duration::from_secs(config.llm.connect_timeout_secs),
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Start a streamed completion for `messages`
    ///
    /// Returns once the provider has accepted the request; the reply text
    /// arrives through the returned [`StreamingResponse`].
    ///
    /// # Errors
    /// - API request failures (network errors, authentication failures)
    /// - Non-success status from the provider
    /// - A success response that is not `text/event-stream`
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<StreamingResponse> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions API: {} (model {}, {} messages)",
            url,
            self.model,
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfRagError::CompletionProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProfRagError::CompletionProviderError(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_event_stream(&content_type) {
            let body = response.text().await.unwrap_or_default();
            return Err(ProfRagError::CompletionProviderError(format!(
                "Expected an event stream, got '{content_type}': {body}"
            )));
        }

        Ok(StreamingResponse::from_sse(response.bytes_stream()))
    }
}

/// Providers that omit the header are trusted to stream
fn is_event_stream(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type
            .split(';')
            .next()
            .is_some_and(|media| media.trim().eq_ignore_ascii_case("text/event-stream"))
}
