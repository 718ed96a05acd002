use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, embed, graph, health, reflective, transcripts};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// This function sets up:
/// - CORS middleware for local development frontends
/// - The health check endpoint
/// - Advanced RAG endpoints (query, continue, embed)
/// - Graph and Reflective RAG endpoints
/// - Transcript endpoints (list, messages, export)
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health::health_check))
        .route("/api/query", post(chat::start_chat))
        .route("/api/query/:chat_id", post(chat::continue_existing_chat))
        .route("/api/embed", post(embed::embed_corpus))
        .route("/api/graph/build", post(graph::build_graph))
        .route("/api/graph/query", post(graph::graph_query))
        .route("/api/reflective/query", post(reflective::reflective_query))
        .route("/api/chats", get(transcripts::list_chats))
        .route(
            "/api/chats/:chat_id/messages",
            get(transcripts::get_chat_messages),
        )
        .route("/api/chats/export", post(transcripts::export_chats))
        .with_state(state)
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer() -> CorsLayer {
    let origins = default_local_origins()
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn default_local_origins() -> Vec<&'static str> {
    vec![
        "http://localhost",
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:8080",
        "http://127.0.0.1",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:8080",
    ]
}
