pub mod api;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::services::QuoteSource;

/// Application state shared across all handlers.
///
/// Only the provider client (an HTTP connection pool) is shared; every
/// request builds and discards its own series, summary, and overlays.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn QuoteSource>,
}

/// Start the axum server
pub async fn serve(
    source: Arc<dyn QuoteSource>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting vnquote server");

    let app_state = AppState { source };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  POST /api/analyze");
    tracing::info!("  GET /api/stocks");
    tracing::info!("  GET /health");

    let app = Router::new()
        .route("/api/analyze", post(api::analyze_handler))
        .route("/api/stocks", get(api::stocks_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
