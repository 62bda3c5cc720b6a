//! Embeddings generation module
//!
//! Turns the newest chat message into a query vector using an OpenAI-compatible
//! `/embeddings` endpoint (`text-embedding-3-small` by default).
//!
//! # Examples
//!
//! ```rust,no_run
//! use profrag::config::AppConfig;
//! use profrag::embeddings::EmbeddingClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_config(&config)?;
//!
//!     let embedding = client.generate("Who teaches algorithms well?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;
