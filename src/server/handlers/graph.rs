//! Graph RAG endpoints.
//!
//! Building the co-occurrence graph is part of the shipped scaffold; the
//! query path is a workshop exercise.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::chat::QueryRequest;
use super::remap_unimplemented;
use crate::core::errors::ApiError;
use crate::corpus;
use crate::graph::CooccurrenceGraph;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GraphBuildRequest {
    pub filename: Option<String>,
}

/// Build the entity co-occurrence graph from a corpus file and write the
/// `nodes.jsonl` / `edges.jsonl` artifacts.
pub async fn build_graph(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<GraphBuildRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let filename = payload
        .filename
        .unwrap_or_else(|| state.settings.retrieval.default_corpus.clone());
    let safe_name = corpus::sanitize_filename(&filename)?;
    let corpus_path = state.paths.corpus_dir.join(&safe_name);

    let records = corpus::load_records(&corpus_path)?;
    let graph = CooccurrenceGraph::from_records(&records);

    let output_dir = state.paths.graph_output_dir();
    let summary = graph.write_artifacts(&output_dir)?;

    tracing::info!(
        "graph build for {}: {} nodes, {} edges",
        safe_name,
        summary.nodes,
        summary.edges
    );

    Ok(Json(json!({
        "nodes": summary.nodes,
        "edges": summary.edges,
        "output_dir": output_dir.display().to_string(),
    })))
}

/// Answer a query against the entity graph.
pub async fn graph_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let response = services::graph_query(&state, &payload.query)
        .await
        .map_err(|err| remap_unimplemented(err, "Graph RAG query service not implemented yet."))?;

    Ok(Json(json!({ "response": response })))
}
