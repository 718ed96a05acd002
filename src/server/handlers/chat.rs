//! Advanced RAG chat endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::remap_unimplemented;
use crate::core::errors::ApiError;
use crate::services;
use crate::state::AppState;

/// Payload for querying the conversational model.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Response structure for chat interactions.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub chat_id: Uuid,
    pub response: String,
}

/// Start a brand-new chat session with the Advanced RAG model.
pub async fn start_chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let (chat_id, response) = services::start_new_chat(&state, &payload.query)
        .await
        .map_err(|err| {
            remap_unimplemented(err, "Advanced RAG start chat service not implemented yet.")
        })?;

    Ok(Json(QueryResponse { chat_id, response }))
}

/// Continue an existing chat session using the provided chat id.
pub async fn continue_existing_chat(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<Uuid>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let response = services::continue_chat(&state, chat_id, &payload.query)
        .await
        .map_err(|err| {
            remap_unimplemented(err, "Advanced RAG continue chat service not implemented yet.")
        })?;

    Ok(Json(QueryResponse { chat_id, response }))
}
