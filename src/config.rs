use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable holding the embedding/completion provider key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the vector index provider key
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            backtrace: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub endpoint: String,
    pub model: String,
    pub encoding_format: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            encoding_format: "float".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Control plane used to resolve `index` to its data-plane host
    pub control_plane: String,
    pub index: String,
    pub namespace: String,
    /// Data-plane host; skips control-plane resolution when set
    pub index_host: Option<String>,
    pub top_k: u32,
    pub timeout_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            control_plane: "https://api.pinecone.io".to_string(),
            index: "rag".to_string(),
            namespace: "ns1".to_string(),
            index_host: None,
            top_k: 5,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    pub llm_model: String,
    /// Only the connection is bounded; a streamed reply may run as long as the provider keeps sending
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: "https://api.openai.com/v1".to_string(),
            llm_model: "gpt-3.5-turbo".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

/// Provider credentials, sourced from the environment only
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai_api_key: String,
    pub pinecone_api_key: String,
}

impl Credentials {
    /// Read credentials from the process environment, honoring a `.env` file
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            openai_api_key: std::env::var(OPENAI_API_KEY_VAR).unwrap_or_default(),
            pinecone_api_key: std::env::var(PINECONE_API_KEY_VAR).unwrap_or_default(),
        }
    }

    /// Both keys are present
    pub fn validate(&self) -> crate::Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(crate::ProfRagError::ConfigError(format!(
                "{OPENAI_API_KEY_VAR} is not set"
            )));
        }
        if self.pinecone_api_key.trim().is_empty() {
            return Err(crate::ProfRagError::ConfigError(format!(
                "{PINECONE_API_KEY_VAR} is not set"
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &mask_secret(&self.openai_api_key))
            .field("pinecone_api_key", &mask_secret(&self.pinecone_api_key))
            .finish()
    }
}

/// Show only the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default file path, then attach credentials from the environment
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        let config = if Path::new("config.toml").exists() {
            Self::from_file("config.toml")?
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")?
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            Self::default()
        };

        Ok(config.with_credentials(Credentials::from_env()))
    }

    /// Load from an explicit path when given, otherwise from the default locations
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        match path {
            Some(path) => Ok(Self::from_file(path)?.with_credentials(Credentials::from_env())),
            None => Self::load(),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Check everything the request pipeline needs before serving
    pub fn validate(&self) -> crate::Result<()> {
        self.credentials.validate()?;

        let required = [
            ("embeddings.endpoint", &self.embeddings.endpoint),
            ("embeddings.model", &self.embeddings.model),
            ("retrieval.index", &self.retrieval.index),
            ("retrieval.namespace", &self.retrieval.namespace),
            ("llm.llm_endpoint", &self.llm.llm_endpoint),
            ("llm.llm_model", &self.llm.llm_model),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(crate::ProfRagError::ConfigError(format!(
                    "{name} must not be empty"
                )));
            }
        }

        if self.retrieval.top_k == 0 {
            return Err(crate::ProfRagError::ConfigError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }

        if self.retrieval.index_host.is_none() && self.retrieval.control_plane.trim().is_empty()
        {
            return Err(crate::ProfRagError::ConfigError(
                "retrieval.control_plane is required when retrieval.index_host is unset"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Address the API server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
