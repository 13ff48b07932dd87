//! Optional HTTP transport serving the same JSON-RPC dispatch as stdio.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;

use crate::mcp::McpServer;

/// Build the HTTP router (public so tests can bind an ephemeral port).
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc", post(rpc))
        .layer(ServiceBuilder::new().layer(Extension(server)))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn rpc(
    Extension(server): Extension<Arc<McpServer>>,
    body: String,
) -> axum::response::Response {
    match server.handle_line(&body).await {
        Some(response) => Json(response).into_response(),
        // Notifications produce no body.
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn serve(addr: SocketAddr, server: Arc<McpServer>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(server)).await?;
    Ok(())
}
