pub mod api;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod retrieval;

#[cfg(test)]
mod config_tests;

pub use config::AppConfig;
pub use errors::*;
