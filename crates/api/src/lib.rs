//! HTTP chat surface for ShopScout.
//!
//! One utterance per turn: the handler runs the full five-stage pipeline
//! and blocks until the final text is ready. Sessions hold a linear
//! transcript and the user's filters; resetting clears both.
//!
//! # Endpoints
//!
//! - `GET  /health` - Health check
//! - `POST /api/v1/chat` - One chat turn (text path)
//! - `POST /api/v1/transcribe` - Audio bytes to text (voice path)
//! - `GET  /api/v1/sessions/{id}` - Session transcript and filters
//! - `POST /api/v1/sessions/{id}/reset` - Clear transcript and filters
//! - `PUT  /api/v1/sessions/{id}/filters` - Set search filters

pub mod routes;
pub mod state;
pub mod transcribe;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;
pub use transcribe::{Transcriber, TranscriptionConfig, WhisperTranscriber};

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/chat", post(routes::chat))
        .route("/api/v1/transcribe", post(routes::transcribe))
        .route("/api/v1/sessions/{id}", get(routes::get_session))
        .route("/api/v1/sessions/{id}/reset", post(routes::reset_session))
        .route("/api/v1/sessions/{id}/filters", put(routes::set_filters))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    info!(%addr, "Starting ShopScout API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
