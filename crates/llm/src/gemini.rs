use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

pub struct GeminiClient {
    model: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String) -> Self {
        Self {
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn role_to_string(role: &Role) -> &'static str {
        match role {
            Role::System => "user", // system prompts go in systemInstruction
            Role::User => "user",
            Role::Assistant => "model",
        }
    }

    fn build_contents(request: &LlmRequest) -> Vec<GeminiContent> {
        request
            .messages
            .iter()
            .filter(|msg| msg.role != Role::System)
            .map(|msg| GeminiContent {
                role: Self::role_to_string(&msg.role).to_string(),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect()
    }

    fn build_body(&self, request: &LlmRequest) -> GeminiRequest {
        GeminiRequest {
            contents: Self::build_contents(request),
            system_instruction: request.system_prompt.as_ref().map(|s| {
                GeminiSystemInstruction {
                    parts: vec![GeminiPart { text: s.clone() }],
                }
            }),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            }),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = self.build_body(&request);
        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopScoutError::Llm(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ShopScoutError::Llm(format!(
                "Gemini API error {status}: {body_text}"
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ShopScoutError::Llm(format!("Failed to parse Gemini response: {e}")))?;

        let candidate = gemini_response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ShopScoutError::Llm("Gemini returned no candidates".into()))?;

        let content = candidate
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        Ok(LlmResponse {
            content,
            model: gemini_response
                .model_version
                .unwrap_or_else(|| self.model.clone()),
            usage: gemini_response.usage_metadata.map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            }),
            finish_reason: candidate.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
