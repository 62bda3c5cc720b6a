//! Embedding API client for OpenAI-compatible providers

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::ProfRagError;
use crate::errors::Result;

/// Client for turning text into an embedding vector
pub struct EmbeddingClient {
    model: String,
    encoding_format: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        model: String,
        encoding_format: String,
        endpoint: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProfRagError::HttpError(e.to_string()))?;

        Ok(Self {
            model,
            encoding_format,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Build the client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.embeddings.model.clone(),
            config.embeddings.encoding_format.clone(),
            config.embeddings.endpoint.clone(),
            config.credentials.openai_api_key.clone(),
            Duration::from_secs(config.embeddings.timeout_secs),
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, no embedding returned)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.endpoint);
        debug!("Calling embeddings API: {} (model {})", url, self.model);

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
            encoding_format: &self.encoding_format,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfRagError::EmbeddingProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProfRagError::EmbeddingProviderError(format!(
                "API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response.json().await.map_err(|e| {
            ProfRagError::EmbeddingProviderError(format!("Failed to parse response: {e}"))
        })?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                ProfRagError::EmbeddingProviderError("No embedding in response".to_string())
            })?;

        if embedding.is_empty() {
            return Err(ProfRagError::EmbeddingProviderError(
                "Provider returned an empty vector".to_string(),
            ));
        }

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}
