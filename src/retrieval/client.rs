//! Vector index client for the Pinecone REST API

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::config::AppConfig;
use crate::errors::ProfRagError;
use crate::errors::Result;
use crate::models::RetrievedMatch;
use crate::models::ReviewMetadata;

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";
const API_VERSION: &str = "2024-07";

/// Client bound to a single index namespace
pub struct VectorIndexClient {
    host: String,
    namespace: String,
    top_k: u32,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    top_k: u32,
    include_metadata: bool,
    vector: &'a [f32],
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Deserialize)]
struct RawMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

impl VectorIndexClient {
    /// Create a client for an already-known data-plane host
    ///
    /// # Errors
    /// - HTTP client build errors
    /// - Host that is not a valid URL
    pub fn new(
        host: &str,
        namespace: String,
        top_k: u32,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            host: normalize_host(host)?,
            namespace,
            top_k,
            api_key,
            client: build_http_client(timeout)?,
        })
    }

    /// Build the client from configuration, resolving the index host through
    /// the control plane when it is not configured explicitly
    ///
    /// # Errors
    /// - Control-plane lookup failures (unknown index, bad credentials)
    /// - HTTP client build errors
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let retrieval = &config.retrieval;
        let timeout = Duration::from_secs(retrieval.timeout_secs);
        let api_key = config.credentials.pinecone_api_key.clone();

        let host = match &retrieval.index_host {
            Some(host) => host.clone(),
            None => {
                let client = build_http_client(timeout)?;
                resolve_index_host(&client, &retrieval.control_plane, &retrieval.index, &api_key)
                    .await?
            }
        };

        info!(
            "Vector index '{}' (namespace '{}') at {}",
            retrieval.index, retrieval.namespace, host
        );

        Self::new(
            &host,
            retrieval.namespace.clone(),
            retrieval.top_k,
            api_key,
            timeout,
        )
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub const fn top_k(&self) -> u32 {
        self.top_k
    }

    /// Query the nearest neighbours of `vector`, in the rank order returned by the index
    ///
    /// Matches without usable metadata are dropped.
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON)
    pub async fn query(&self, vector: &[f32]) -> Result<Vec<RetrievedMatch>> {
        let url = format!("{}/query", self.host);
        debug!(
            "Querying vector index: {} (topK {}, namespace {})",
            url, self.top_k, self.namespace
        );

        let request = QueryRequest {
            namespace: &self.namespace,
            top_k: self.top_k,
            include_metadata: true,
            vector,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_VERSION_HEADER, API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProfRagError::RetrievalProviderError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProfRagError::RetrievalProviderError(format!(
                "Query failed ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response.json().await.map_err(|e| {
            ProfRagError::RetrievalProviderError(format!("Failed to parse response: {e}"))
        })?;

        let matches = into_matches(result.matches);
        debug!("Retrieved {} matches", matches.len());
        Ok(matches)
    }
}

fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ProfRagError::HttpError(e.to_string()))
}

fn into_matches(raw: Vec<RawMatch>) -> Vec<RetrievedMatch> {
    raw.into_iter()
        .filter_map(|m| {
            let Some(value) = m.metadata else {
                warn!("Skipping match '{}' without metadata", m.id);
                return None;
            };
            match serde_json::from_value::<ReviewMetadata>(value) {
                Ok(metadata) => Some(RetrievedMatch {
                    id: m.id,
                    score: m.score,
                    metadata,
                }),
                Err(e) => {
                    warn!("Skipping match '{}' with unusable metadata: {}", m.id, e);
                    None
                }
            }
        })
        .collect()
}

/// Look up the data-plane host of `index` through the control plane
///
/// # Errors
/// - Unknown index or rejected credentials
/// - Network failures
pub async fn resolve_index_host(
    client: &Client,
    control_plane: &str,
    index: &str,
    api_key: &str,
) -> Result<String> {
    let url = format!("{}/indexes/{}", control_plane.trim_end_matches('/'), index);
    debug!("Resolving index host: {}", url);

    let response = client
        .get(&url)
        .header(API_KEY_HEADER, api_key)
        .header(API_VERSION_HEADER, API_VERSION)
        .send()
        .await
        .map_err(|e| ProfRagError::RetrievalProviderError(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProfRagError::RetrievalProviderError(format!(
            "Failed to describe index '{index}' ({status}): {error_text}"
        )));
    }

    let description: IndexDescription = response.json().await.map_err(|e| {
        ProfRagError::RetrievalProviderError(format!("Failed to parse index description: {e}"))
    })?;

    normalize_host(&description.host)
}

/// Index hosts come back without a scheme; default to https
fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    let candidate = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| ProfRagError::ConfigError(format!("Invalid index host '{host}': {e}")))?;
    if url.host_str().is_none() {
        return Err(ProfRagError::ConfigError(format!(
            "Invalid index host '{host}': missing host name"
        )));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}
