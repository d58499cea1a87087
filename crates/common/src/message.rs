//! Chat session and message types.

use serde::{Deserialize, Serialize};

use crate::filters::SearchFilters;

/// Role of a message in the session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    /// Unique message ID
    pub id: String,

    /// Role of the sender
    pub role: MessageRole,

    /// Message content
    pub content: String,

    /// Timestamp (Unix millis)
    pub timestamp: u64,
}

impl SessionMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            role,
            content: content.into(),
            timestamp: now_millis(),
        }
    }
}

/// A chat session: a linear transcript plus the user's current filters.
///
/// Sessions are scoped to one user and mutated only by that user's own
/// turns. Resetting returns the session to its initial empty state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    /// Ordered transcript of alternating user/assistant entries
    pub messages: Vec<SessionMessage>,

    /// Current search filters, read by the refine stage only
    pub filters: SearchFilters,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed turn: the user utterance and the final answer.
    pub fn record_turn(&mut self, utterance: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(SessionMessage::user(utterance));
        self.messages.push(SessionMessage::assistant(answer));
    }

    /// Clear the transcript and filters back to their initial state.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.filters = SearchFilters::default();
    }
}

fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_turn_appends_user_then_assistant() {
        let mut session = Session::new();
        session.record_turn("find me headphones", "Here are some options");

        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(session.messages[0].content, "find me headphones");
        assert_eq!(session.messages[1].role, MessageRole::Assistant);
    }

    #[test]
    fn reset_clears_transcript_and_filters() {
        let mut session = Session::new();
        session.filters.min_rating = Some(4.0);
        session.filters.preferred_brand = Some("Sony".into());
        session.record_turn("hi", "hello");

        session.reset();

        assert!(session.messages.is_empty());
        assert!(session.filters.min_rating.is_none());
        assert!(session.filters.preferred_brand.is_none());
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = SessionMessage::user("Hello");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: SessionMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.role, MessageRole::User);
        assert_eq!(deserialized.content, "Hello");
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MessageRole::User).unwrap(),
            "\"user\""
        );
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
