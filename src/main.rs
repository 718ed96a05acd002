use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use raglab_backend::core::logging;
use raglab_backend::server;
use raglab_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    logging::init(&state.paths);

    if !state.llm.health_check().await.unwrap_or(false) {
        tracing::warn!(
            "Ollama is not reachable at {}; chat and embedding calls will fail until it is up",
            state.settings.ollama.resolved_base_url()
        );
    }

    let bind_addr = format!("127.0.0.1:{}", state.settings.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
