//! Transcript inspection and export endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

/// All chat identifiers that have been persisted.
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chats = state.history.list_chats()?;
    Ok(Json(json!({ "chats": chats })))
}

/// The persisted message history for the given chat.
pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
    Path(chat_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let messages = state.history.load(&chat_id)?;
    if messages.is_empty() {
        return Err(ApiError::NotFound(format!("chat not found: {}", chat_id)));
    }

    Ok(Json(json!({
        "chat_id": chat_id,
        "messages": messages,
    })))
}

/// Materialise all conversations into a single JSON-Lines file for
/// downstream analysis.
pub async fn export_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let destination = state.paths.outputs_dir.join("conversations_export.jsonl");
    let exported = state.history.export(&destination)?;

    tracing::info!(
        "exported {} chats to {}",
        exported,
        destination.display()
    );

    Ok(Json(json!({
        "exported_chats": exported,
        "destination": destination.display().to_string(),
    })))
}
