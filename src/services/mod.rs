//! Service layer skeleton for the workshop RAG pipelines.
//!
//! These functions are the workshop exercises. The scaffold around them
//! is complete — chunking (`rag::DocumentChunker`), embedding generation
//! (`rag::EmbeddingGenerator`), the vector index (`rag::SqliteVectorStore`),
//! transcripts (`history::ConversationStore`), the chat wrapper
//! (`llm::ChatService`), and the co-occurrence graph (`graph`) — so each
//! exercise is about composing those pieces, not building plumbing.

use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// Initialize a new conversational session for the Advanced RAG workflow.
///
/// Returns the chat session UUID and the model response to the initial
/// query.
pub async fn start_new_chat(
    _state: &AppState,
    _user_query: &str,
) -> Result<(Uuid, String), ApiError> {
    Err(ApiError::NotImplemented(
        "Advanced RAG start_new_chat service not implemented.".to_string(),
    ))
}

/// Continue an existing chat session by appending a new user query.
///
/// Returns the model-generated response tied to the provided chat id.
pub async fn continue_chat(
    _state: &AppState,
    _chat_id: Uuid,
    _user_query: &str,
) -> Result<String, ApiError> {
    Err(ApiError::NotImplemented(
        "Advanced RAG continue_chat service not implemented.".to_string(),
    ))
}

/// Chunk the named corpus file and persist one embedding per chunk into
/// the vector index.
///
/// Returns the number of chunks successfully embedded.
pub async fn embed_documents(
    _state: &AppState,
    _filename: &str,
    _chunk_size: usize,
    _overlap: usize,
) -> Result<usize, ApiError> {
    Err(ApiError::NotImplemented(
        "Advanced RAG embed_documents service not implemented.".to_string(),
    ))
}

/// Answer a query by retrieving from the entity co-occurrence graph built
/// by `POST /api/graph/build`.
pub async fn graph_query(_state: &AppState, _user_query: &str) -> Result<String, ApiError> {
    Err(ApiError::NotImplemented(
        "Graph RAG query service not implemented.".to_string(),
    ))
}

/// Answer a query by drafting a response, critiquing it, and revising
/// before returning.
pub async fn reflective_query(_state: &AppState, _user_query: &str) -> Result<String, ApiError> {
    Err(ApiError::NotImplemented(
        "Reflective RAG query service not implemented.".to_string(),
    ))
}
