//! Auxiliary HTTP listener
//!
//! Hosting platforms expect the process to bind a port. The bot itself
//! does not depend on anything served here.

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;

const SERVICE_NAME: &str = "chain-tracker-bot";

/// Build the listener's router
pub fn build_router() -> Router {
    Router::new()
        .route("/", post(accept_json))
        .route("/health", get(health_check))
}

/// Bind and serve until the process exits
pub async fn serve(port: u16) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server is running on port {}", port);

    axum::serve(listener, build_router()).await
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
    }))
}

async fn accept_json(Json(body): Json<Value>) -> impl IntoResponse {
    tracing::debug!("Ignoring HTTP payload: {}", body);
    (StatusCode::ACCEPTED, Json(json!({ "accepted": true })))
}
