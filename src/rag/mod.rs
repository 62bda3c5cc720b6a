//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers a chat conversation with professor recommendations:
//! - Embedding of the newest user message
//! - Nearest-neighbour retrieval of stored reviews
//! - Context assembly appended to the user's message
//! - Streamed LLM answer generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use profrag::config::AppConfig;
//! use profrag::models::ChatMessage;
//! use profrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config).await?;
//!
//!     let reply = service
//!         .chat(vec![ChatMessage::user("Who teaches algorithms well?")])
//!         .await?
//!         .collect_all()
//!         .await?;
//!     println!("Answer: {reply}");
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;

pub use context::ContextAssembler;
pub use pipeline::build_completion_messages;
pub use pipeline::validate_messages;
pub use pipeline::RagService;
