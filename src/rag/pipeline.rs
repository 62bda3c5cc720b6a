//! Complete RAG pipeline: Embed -> Retrieve -> Augment -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::errors::ProfRagError;
use crate::errors::Result;
use crate::llm::ChatCompletionClient;
use crate::llm::StreamingResponse;
use crate::llm::SYSTEM_PROMPT;
use crate::models::ChatMessage;
use crate::models::Role;
use crate::rag::ContextAssembler;
use crate::retrieval::VectorIndexClient;

/// Complete RAG service
///
/// Holds no per-request state, so one instance serves every request.
pub struct RagService {
    embeddings: Arc<EmbeddingClient>,
    index: Arc<VectorIndexClient>,
    llm: Arc<ChatCompletionClient>,
    context_assembler: ContextAssembler,
}

impl RagService {
    /// Create a new RAG service
    ///
    /// # Errors
    /// - HTTP client build errors
    /// - Vector index host resolution errors (unknown index, bad credentials)
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let embeddings = Arc::new(EmbeddingClient::from_config(config)?);
        let index = Arc::new(VectorIndexClient::connect(config).await?);
        let llm = Arc::new(ChatCompletionClient::from_config(config)?);
        info!(
            "RAG service ready (embedding model {}, completion model {})",
            embeddings.model(),
            llm.model()
        );

        Ok(Self::from_services(embeddings, index, llm))
    }

    /// Create from existing clients
    #[must_use]
    pub fn from_services(
        embeddings: Arc<EmbeddingClient>,
        index: Arc<VectorIndexClient>,
        llm: Arc<ChatCompletionClient>,
    ) -> Self {
        Self {
            embeddings,
            index,
            llm,
            context_assembler: ContextAssembler::new(),
        }
    }

    /// Answer the conversation, streaming the assistant's reply
    ///
    /// # Errors
    /// - `InvalidRequest` for an empty conversation or one not ending in a user message
    /// - Embedding, retrieval or completion provider errors raised before the stream starts
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<StreamingResponse> {
        let prompt = self.build_prompt(messages).await?;

        debug!("Step 3: Starting completion stream");
        let response = self.llm.stream_chat(&prompt).await?;

        info!("Completion stream started ({} prompt messages)", prompt.len());
        Ok(response)
    }

    /// Run embedding and retrieval, and return the message list sent to the completion provider
    ///
    /// # Errors
    /// - `InvalidRequest` for an empty conversation or one not ending in a user message
    /// - Embedding or retrieval provider errors
    pub async fn build_prompt(&self, mut messages: Vec<ChatMessage>) -> Result<Vec<ChatMessage>> {
        validate_messages(&messages)?;
        let Some(last) = messages.pop() else {
            return Err(ProfRagError::InvalidRequest(
                "conversation has no messages".to_string(),
            ));
        };
        info!("Processing chat request ({} messages)", messages.len() + 1);
        debug!("Latest message: {}", last.content);

        debug!("Step 1: Embedding latest message");
        let vector = self.embeddings.generate(&last.content).await?;

        debug!("Step 2: Querying vector index");
        let matches = self.index.query(&vector).await?;
        info!("Retrieved {} reviews", matches.len());

        let augmented = self.context_assembler.augment(&last.content, &matches);
        Ok(build_completion_messages(messages, augmented))
    }
}

/// Check that the conversation is non-empty and ends with a user message that has text
///
/// # Errors
/// - `InvalidRequest` describing the first violated rule
pub fn validate_messages(messages: &[ChatMessage]) -> Result<()> {
    let last = messages.last().ok_or_else(|| {
        ProfRagError::InvalidRequest("conversation has no messages".to_string())
    })?;

    if last.role != Role::User {
        return Err(ProfRagError::InvalidRequest(format!(
            "last message must come from the user, got '{}'",
            last.role
        )));
    }

    if last.content.trim().is_empty() {
        return Err(ProfRagError::InvalidRequest(
            "last message has no content".to_string(),
        ));
    }

    Ok(())
}

/// System prompt, then the earlier turns unchanged, then the augmented user turn
#[must_use]
pub fn build_completion_messages(history: Vec<ChatMessage>, augmented: String) -> Vec<ChatMessage> {
    let mut prompt = Vec::with_capacity(history.len() + 2);
    prompt.push(ChatMessage::system(SYSTEM_PROMPT));
    prompt.extend(history);
    prompt.push(ChatMessage::user(augmented));
    prompt
}
