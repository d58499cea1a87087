//! Voice transcription adapter.
//!
//! Converts a captured audio buffer into text via a Whisper-style REST
//! endpoint. Used only on the voice path. A transcription failure is
//! recoverable: the turn is abandoned and the user may retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_api_url() -> String {
    "https://api.openai.com".into()
}

fn default_model() -> String {
    "whisper-1".into()
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: None,
        }
    }
}

impl TranscriptionConfig {
    /// Resolve the API key from config or OPENAI_API_KEY.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("OPENAI_API_KEY").ok()
    }
}

/// Speech-to-text seam.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String>;
}

#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Whisper-style multipart transcription client.
#[derive(Debug)]
pub struct WhisperTranscriber {
    config: TranscriptionConfig,
    api_key: String,
    http_client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ShopScoutError::Config(
                "Voice mode requires a transcription API key (set OPENAI_API_KEY)".into(),
            )
        })?;
        Ok(Self {
            config,
            api_key,
            http_client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<String> {
        debug!(bytes = audio.len(), filename = %filename, "Transcribing audio");

        let part = reqwest::multipart::Part::bytes(audio).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        let response = self
            .http_client
            .post(format!("{}/v1/audio/transcriptions", self.config.api_url))
            .header("authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ShopScoutError::Transcription(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ShopScoutError::Transcription(format!(
                "Provider error {status}: {body_text}"
            )));
        }

        let whisper: WhisperResponse = response
            .json()
            .await
            .map_err(|e| ShopScoutError::Transcription(format!("Unreadable response: {e}")))?;

        let text = whisper.text.trim().to_string();
        if text.is_empty() {
            return Err(ShopScoutError::Transcription(
                "Could not understand audio".into(),
            ));
        }

        info!(chars = text.len(), "Transcription completed");
        Ok(text)
    }
}
