//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shopscout_common::{SearchFilters, SessionMessage};
use shopscout_pipeline::PipelineInput;
use tracing::{error, info};

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub voice_enabled: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        voice_enabled: state.transcriber.is_some(),
    })
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl ErrorResponse {
    fn status(&self) -> StatusCode {
        match self.code {
            "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VOICE_DISABLED" => StatusCode::SERVICE_UNAVAILABLE,
            "TRANSCRIPTION_ERROR" => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

fn default_session() -> String {
    "default".into()
}

/// One chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub content: String,
    #[serde(default = "default_session")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
    /// True when any stage ran on incomplete upstream data
    pub degraded: bool,
    pub duration_ms: u64,
}

/// Run one utterance through the full pipeline and record the turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ErrorResponse> {
    if request.content.trim().is_empty() {
        return Err(ErrorResponse {
            error: "Message content is empty".into(),
            code: "INVALID_INPUT",
        });
    }

    info!(
        session_id = %request.session_id,
        content_preview = %request.content.chars().take(50).collect::<String>(),
        "Received chat turn"
    );

    let filters = state.filters(&request.session_id).await;
    let input = PipelineInput::new(&request.content).with_filters(filters);

    let run = state.pipeline.run(input).await.map_err(|e| {
        error!(error = %e, "Pipeline run failed");
        ErrorResponse {
            error: format!("Pipeline run failed: {e}"),
            code: "PIPELINE_ERROR",
        }
    })?;

    state
        .record_turn(&request.session_id, &request.content, &run.final_output)
        .await;

    Ok(Json(ChatResponse {
        session_id: request.session_id,
        reply: run.final_output,
        degraded: run.degraded,
        duration_ms: run.duration_ms,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TranscribeQuery {
    #[serde(default = "default_audio_filename")]
    pub filename: String,
}

fn default_audio_filename() -> String {
    "audio.webm".into()
}

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

/// Voice path: audio bytes in, recognized text out. The caller feeds the
/// text back through the chat endpoint as a normal turn.
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TranscribeQuery>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, ErrorResponse> {
    let Some(ref transcriber) = state.transcriber else {
        return Err(ErrorResponse {
            error: "Voice mode is not enabled on this server".into(),
            code: "VOICE_DISABLED",
        });
    };

    if body.is_empty() {
        return Err(ErrorResponse {
            error: "Audio body is empty".into(),
            code: "INVALID_INPUT",
        });
    }

    match transcriber.transcribe(body.to_vec(), &query.filename).await {
        Ok(text) => Ok(Json(TranscribeResponse { text })),
        Err(e) => {
            // Recoverable: the turn is abandoned, the user may retry
            error!(error = %e, "Transcription failed");
            Err(ErrorResponse {
                error: e.to_string(),
                code: "TRANSCRIPTION_ERROR",
            })
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub messages: Vec<SessionMessage>,
    pub filters: SearchFilters,
}

/// Session transcript and filters.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ErrorResponse> {
    match state.session(&session_id).await {
        Some(session) => Ok(Json(SessionResponse {
            session_id,
            messages: session.messages,
            filters: session.filters,
        })),
        None => Err(ErrorResponse {
            error: format!("No session '{session_id}'"),
            code: "NOT_FOUND",
        }),
    }
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_id: String,
    pub status: &'static str,
}

/// Clear the transcript and filters back to their initial state.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<ResetResponse> {
    info!(session_id = %session_id, "Resetting session");
    state.reset_session(&session_id).await;
    Json(ResetResponse {
        session_id,
        status: "reset",
    })
}

/// Replace the session's search filters.
pub async fn set_filters(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(filters): Json<SearchFilters>,
) -> Json<SessionResponse> {
    info!(session_id = %session_id, ?filters, "Updating filters");
    state.set_filters(&session_id, filters).await;

    let session = state.session(&session_id).await.unwrap_or_default();
    Json(SessionResponse {
        session_id,
        messages: session.messages,
        filters: session.filters,
    })
}
