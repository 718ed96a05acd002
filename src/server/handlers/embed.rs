//! Corpus embedding endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::remap_unimplemented;
use crate::core::errors::ApiError;
use crate::corpus;
use crate::services;
use crate::state::AppState;

/// Payload for kicking off embedding generation. All fields are optional;
/// defaults come from the chunking settings.
#[derive(Debug, Default, Deserialize)]
pub struct EmbedRequest {
    pub filename: Option<String>,
    pub chunk_size: Option<usize>,
    pub overlap: Option<usize>,
}

/// Response after generating embeddings.
#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embedded_documents: usize,
    pub message: String,
}

/// Trigger corpus chunking and embedding generation.
pub async fn embed_corpus(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<EmbedRequest>>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let filename = payload
        .filename
        .unwrap_or_else(|| state.settings.retrieval.default_corpus.clone());
    let safe_name = corpus::sanitize_filename(&filename)?;

    let chunk_size = payload
        .chunk_size
        .unwrap_or(state.settings.chunking.chunk_size);
    let overlap = payload.overlap.unwrap_or(state.settings.chunking.overlap);

    let embedded_count = services::embed_documents(&state, &safe_name, chunk_size, overlap)
        .await
        .map_err(|err| match err {
            ApiError::NotFound(msg) => {
                tracing::warn!("embed_documents file error: {}", msg);
                ApiError::NotFound(msg)
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("embed_documents validation error: {}", msg);
                ApiError::BadRequest(msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!("embed_documents runtime error: {}", msg);
                ApiError::Internal(msg)
            }
            other => {
                remap_unimplemented(other, "Advanced RAG embedding service not implemented yet.")
            }
        })?;

    Ok(Json(EmbedResponse {
        embedded_documents: embedded_count,
        message: format!("Embedding job completed for {}.", safe_name),
    }))
}
