use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError};

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::gemini::GeminiClient;
use crate::openai::OpenAiClient;
use crate::retry::{RetryConfig, RetryingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type: "gemini" or "openai"
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".into(),
            model: "gemini-2.0-flash-lite".into(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: None,
            max_concurrent_requests: default_max_concurrent(),
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or the provider's environment
    /// variable (GOOGLE_API_KEY for Gemini, OPENAI_API_KEY for OpenAI).
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        let env_var = match self.provider.as_str() {
            "gemini" => "GOOGLE_API_KEY",
            "openai" => "OPENAI_API_KEY",
            _ => return None,
        };

        std::env::var(env_var).ok()
    }
}

/// Caps concurrent in-flight requests against the provider.
pub struct SemaphoredClient {
    inner: Arc<dyn LlmClient>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent)),
        }
    }
}

#[async_trait]
impl LlmClient for SemaphoredClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ShopScoutError::Llm(format!("Semaphore acquire failed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let base_client: Box<dyn LlmClient> = match config.provider.as_str() {
        "gemini" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                ShopScoutError::Config(
                    "Gemini requires an API key (set GOOGLE_API_KEY)".to_string(),
                )
            })?;
            Box::new(GeminiClient::new(config.model.clone(), api_key))
        }
        "openai" => Box::new(OpenAiClient::new(
            config.api_url.clone(),
            config.model.clone(),
            config.resolve_api_key(),
        )),
        other => {
            return Err(ShopScoutError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };

    let retrying: Box<dyn LlmClient> =
        Box::new(RetryingClient::new(base_client, config.retry.clone()));

    let semaphored = SemaphoredClient::new(Arc::from(retrying), config.max_concurrent_requests);

    Ok(Arc::new(semaphored))
}
