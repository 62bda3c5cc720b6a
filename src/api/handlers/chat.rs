/// Chat handler: the RAG endpoint
use axum::body::Body;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use tracing::info;

use super::AppState;
use crate::api::types::ApiError;
use crate::errors::ProfRagError;
use crate::models::ChatMessage;

/// Stream a recommendation for the conversation in the body
///
/// The body is a JSON array of `{role, content}`. The reply is raw text,
/// written chunk by chunk as the model produces it. If the model fails
/// part-way, the body is aborted rather than finished cleanly.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let messages: Vec<ChatMessage> = serde_json::from_slice(&body)
        .map_err(|e| ProfRagError::InvalidRequest(format!("malformed conversation: {e}")))?;
    info!("POST /api/chat: {} messages", messages.len());

    let reply = state.rag_service.chat(messages).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(reply.relay()),
    )
        .into_response())
}
