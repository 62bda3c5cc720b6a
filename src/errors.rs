use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfRagError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Embedding provider error: {0}")]
    EmbeddingProviderError(String),

    #[error("Retrieval provider error: {0}")]
    RetrievalProviderError(String),

    #[error("Completion provider error: {0}")]
    CompletionProviderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP client error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProfRagError {
    /// Whether the failure came from one of the upstream providers
    #[must_use]
    pub const fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingProviderError(_)
                | Self::RetrievalProviderError(_)
                | Self::CompletionProviderError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ProfRagError>;
