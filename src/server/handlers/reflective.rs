//! Reflective RAG endpoint. The draft-critique-revise loop is a workshop
//! exercise.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::json;

use super::chat::QueryRequest;
use super::remap_unimplemented;
use crate::core::errors::ApiError;
use crate::services;
use crate::state::AppState;

/// Answer a query with a drafted, critiqued, and revised response.
pub async fn reflective_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let response = services::reflective_query(&state, &payload.query)
        .await
        .map_err(|err| {
            remap_unimplemented(err, "Reflective RAG query service not implemented yet.")
        })?;

    Ok(Json(json!({ "response": response })))
}
