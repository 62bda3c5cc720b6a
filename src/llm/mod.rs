//! Chat-completion provider access
//!
//! [`ChatCompletionClient`] starts a streamed completion; the reply comes back
//! as a [`StreamingResponse`] of text deltas.

pub mod client;
pub mod prompts;
pub mod streaming;

pub use client::ChatCompletionClient;
pub use prompts::SYSTEM_PROMPT;
pub use streaming::RelayState;
pub use streaming::StreamingResponse;
