//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;
    use crate::ProfRagError;

    fn credentials() -> Credentials {
        Credentials {
            openai_api_key: "sk-test-openai-key".to_string(),
            pinecone_api_key: "pc-test-key".to_string(),
        }
    }

    // ====== Default Value Tests ======

    #[test]
    fn test_default_providers() {
        let config = AppConfig::default();
        assert_eq!(config.embeddings.model, "text-embedding-3-small");
        assert_eq!(config.embeddings.encoding_format, "float");
        assert_eq!(config.llm.llm_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_default_retrieval() {
        let config = RetrievalConfig::default();
        assert_eq!(config.index, "rag");
        assert_eq!(config.namespace, "ns1");
        assert_eq!(config.top_k, 5);
        assert!(config.index_host.is_none());
    }

    #[test]
    fn test_bind_address() {
        let mut config = AppConfig::default();
        config.server.host = "0.0.0.0".to_string();
        config.server.port = 8080;
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [retrieval]
            index_host = "https://rag-abc123.svc.pinecone.io"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(
            config.retrieval.index_host.as_deref(),
            Some("https://rag-abc123.svc.pinecone.io")
        );
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.llm_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_credentials_never_read_from_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [credentials]
            openai_api_key = "from-file"
            "#,
        )
        .unwrap();
        assert!(config.credentials.openai_api_key.is_empty());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [logging]
            level = "debug"

            [llm]
            llm_model = "gpt-4o-mini"
            "#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.llm_model(), "gpt-4o-mini");
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let result = AppConfig::from_file(file.path());
        assert!(matches!(result, Err(ProfRagError::TomlParsing(_))));
    }

    #[test]
    fn test_from_missing_file() {
        let result = AppConfig::from_file("/nonexistent/profrag/config.toml");
        assert!(matches!(result, Err(ProfRagError::Io(_))));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_validate_ok() {
        let config = AppConfig::default().with_credentials(credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_openai_key() {
        let mut creds = credentials();
        creds.openai_api_key = String::new();
        let config = AppConfig::default().with_credentials(creds);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(OPENAI_API_KEY_VAR));
    }

    #[test]
    fn test_validate_missing_pinecone_key() {
        let mut creds = credentials();
        creds.pinecone_api_key = "   ".to_string();
        let config = AppConfig::default().with_credentials(creds);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains(PINECONE_API_KEY_VAR));
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = AppConfig::default().with_credentials(credentials());
        config.retrieval.top_k = 0;
        assert!(matches!(
            config.validate(),
            Err(ProfRagError::ConfigError(_))
        ));
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = AppConfig::default().with_credentials(credentials());
        config.embeddings.model = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("embeddings.model"));
    }

    // ====== Secret Masking ======

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<unset>");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("sk-1234567890"), "****7890");
    }

    #[test]
    fn test_credentials_debug_is_masked() {
        let debug = format!("{:?}", credentials());
        assert!(!debug.contains("sk-test-openai-key"));
        assert!(debug.contains("****-key"));
    }
}
