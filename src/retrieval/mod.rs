//! Nearest-neighbour retrieval over the professor review index

pub mod client;

pub use client::resolve_index_host;
pub use client::VectorIndexClient;
