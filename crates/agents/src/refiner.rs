//! Input refiner - turns a raw utterance into a search query.

use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, StageRequest};
use shopscout_llm::{LlmClient, LlmRequest};
use tracing::info;

use crate::traits::{Agent, Persona};

const ROLE: &str = "User Input Collector";
const GOAL: &str = "Gather and clarify user requirements for product search from text or voice \
                    input, with a focus on products available in Pakistan.";
const BACKSTORY: &str = "You are an expert in understanding user needs from various input types \
                         and translating them into clear, localized search parameters, ensuring \
                         the results are relevant to users in Pakistan.";

/// Refines the user's utterance (plus any active filters) into a single
/// optimized search query, or a clarifying question when the request is
/// too vague to search for.
pub struct RefinerAgent {
    persona: Persona,
    llm: Arc<dyn LlmClient>,
}

impl RefinerAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            persona: Persona::new(ROLE, GOAL, BACKSTORY),
            llm,
        }
    }

    /// Render the stage prompt. Both filter constraints, when set, must be
    /// present in the rendered text.
    pub fn render_prompt(request: &StageRequest) -> String {
        let mut prompt = format!(
            "Take the user's input: '{}' and convert it into a clean, optimized search query \
             for online product discovery in Pakistan. Include the keywords and phrases that \
             would surface the best matching products.",
            request.utterance
        );

        if !request.filters.is_empty() {
            prompt.push_str(&format!(
                "\n\nApply these constraints to the query: {}.",
                request.filters.describe()
            ));
        }

        prompt.push_str(
            "\n\nReply with the search query only. If the request is too ambiguous to build a \
             query from, reply with a single clarifying question instead.",
        );

        prompt
    }
}

#[async_trait]
impl Agent for RefinerAgent {
    fn id(&self) -> &str {
        "refiner"
    }

    fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn execute(&self, request: &StageRequest) -> Result<String> {
        info!(agent = %self.id(), utterance = %request.utterance, "Refining user input");

        let response = self
            .llm
            .complete(
                LlmRequest::single_turn(self.persona.system_prompt(), Self::render_prompt(request))
                    .with_temperature(0.2),
            )
            .await?;

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopscout_common::SearchFilters;
    use shopscout_llm::LlmResponse;

    #[test]
    fn prompt_contains_the_utterance() {
        let request = StageRequest::new("noise cancelling headphones", SearchFilters::default());
        let prompt = RefinerAgent::render_prompt(&request);
        assert!(prompt.contains("noise cancelling headphones"));
    }

    #[test]
    fn prompt_contains_both_filter_constraints() {
        let request = StageRequest::new(
            "noise cancelling headphones",
            SearchFilters {
                min_rating: Some(4.0),
                preferred_brand: Some("Sony".into()),
            },
        );
        let prompt = RefinerAgent::render_prompt(&request);
        assert!(prompt.contains("4.0"));
        assert!(prompt.contains("Sony"));
    }

    #[test]
    fn empty_filters_leave_no_constraint_section() {
        let request = StageRequest::new("headphones", SearchFilters::default());
        let prompt = RefinerAgent::render_prompt(&request);
        assert!(!prompt.contains("constraints"));
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
            Ok(LlmResponse {
                content: format!("  refined: {}  ", request.messages[0].content.len()),
                model: "mock".into(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn execute_trims_the_llm_output() {
        let agent = RefinerAgent::new(Arc::new(EchoLlm));
        let request = StageRequest::new("headphones", SearchFilters::default());
        let output = agent.execute(&request).await.unwrap();
        assert!(output.starts_with("refined:"));
        assert!(!output.ends_with(' '));
    }
}
