//! Application state for the API server.

use std::collections::HashMap;
use std::sync::Arc;

use shopscout_common::{SearchFilters, Session};
use shopscout_pipeline::ShoppingPipeline;
use tokio::sync::RwLock;

use crate::transcribe::Transcriber;

/// Shared application state.
///
/// The pipeline and agent configuration are read-only after startup, so
/// concurrent turns from different sessions need no coordination beyond
/// the per-session map lock.
pub struct AppState {
    /// The five-stage pipeline, shared by every session
    pub pipeline: Arc<ShoppingPipeline>,

    /// Voice transcription adapter, present only when voice mode is on
    pub transcriber: Option<Arc<dyn Transcriber>>,

    /// Per-session transcript and filters
    sessions: RwLock<HashMap<String, Session>>,

    /// Server start time (for health checks)
    start_time: std::time::Instant,
}

impl AppState {
    pub fn new(pipeline: Arc<ShoppingPipeline>) -> Self {
        Self {
            pipeline,
            transcriber: None,
            sessions: RwLock::new(HashMap::new()),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// The session's current filters, if the session exists.
    pub async fn filters(&self, session_id: &str) -> SearchFilters {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|s| s.filters.clone())
            .unwrap_or_default()
    }

    /// Replace the session's filters, creating the session if needed.
    pub async fn set_filters(&self, session_id: &str, filters: SearchFilters) {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .filters = filters;
    }

    /// Append one completed turn to the session transcript.
    pub async fn record_turn(&self, session_id: &str, utterance: &str, answer: &str) {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_default()
            .record_turn(utterance, answer);
    }

    /// Snapshot a session, if it exists.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Reset a session to its initial empty state. Resetting a session
    /// that never existed is a no-op.
    pub async fn reset_session(&self, session_id: &str) {
        if let Some(session) = self.sessions.write().await.get_mut(session_id) {
            session.reset();
        }
    }
}
