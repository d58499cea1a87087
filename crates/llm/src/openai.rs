use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat-completions endpoints. Also covers
/// self-hosted gateways that speak the same wire format.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_messages(request: &LlmRequest) -> Vec<OpenAiMessage> {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system_prompt {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for msg in &request.messages {
            messages.push(OpenAiMessage {
                role: Self::role_to_string(&msg.role).to_string(),
                content: msg.content.clone(),
            });
        }
        messages
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = OpenAiRequest {
            model: self.model.clone(),
            messages: Self::build_messages(&request),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut http_request = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("content-type", "application/json")
            .json(&body);

        if let Some(ref key) = self.api_key {
            http_request = http_request.header("authorization", format!("Bearer {key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ShopScoutError::Llm(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ShopScoutError::Llm(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ShopScoutError::Llm(format!("Failed to parse OpenAI response: {e}")))?;

        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ShopScoutError::Llm("OpenAI returned no choices".into()))?;

        Ok(LlmResponse {
            content: choice.message.content,
            model: openai_response.model,
            usage: openai_response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
