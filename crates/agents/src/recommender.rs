//! Recommendation specialist - writes the final answer.

use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, StageKind, StageRequest};
use shopscout_llm::{LlmClient, LlmRequest};
use tracing::info;

use crate::traits::{Agent, Persona};

const ROLE: &str = "Shopping Recommendation Specialist";
const GOAL: &str = "Recommend the best-fit product with reasoning and a purchase link.";
const BACKSTORY: &str = "You are a friendly and knowledgeable assistant who understands the \
                         user's needs and suggests the best option for them.";

/// Produces the final recommendation from the analysis and review
/// outputs. This is the only stage with two direct predecessors.
pub struct RecommenderAgent {
    persona: Persona,
    llm: Arc<dyn LlmClient>,
}

impl RecommenderAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            persona: Persona::new(ROLE, GOAL, BACKSTORY),
            llm,
        }
    }

    fn render_prompt(request: &StageRequest) -> String {
        let analysis = request
            .context_for(StageKind::Analyze)
            .map(|o| o.text.as_str())
            .unwrap_or("no analysis available");
        let review = request
            .context_for(StageKind::Review)
            .map(|o| o.text.as_str())
            .unwrap_or("no review data available");

        format!(
            "The user asked: '{}'\n\nProduct analysis:\n\n{analysis}\n\n\
             Review summary:\n\n{review}\n\n\
             Recommend the single best product for the user. Explain the reasoning, mention \
             the notable pros and cons, and include the purchase link from the analysis. If \
             the analysis contains no usable product, say so honestly and suggest how the \
             user could refine their request.\n\nIf the analysis above is a clarifying \
             question rather than product information, repeat the question unchanged and \
             nothing else.",
            request.utterance
        )
    }
}

#[async_trait]
impl Agent for RecommenderAgent {
    fn id(&self) -> &str {
        "recommender"
    }

    fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn execute(&self, request: &StageRequest) -> Result<String> {
        info!(
            agent = %self.id(),
            context_stages = request.context.len(),
            "Writing recommendation"
        );

        let response = self
            .llm
            .complete(
                LlmRequest::single_turn(
                    self.persona.system_prompt(),
                    Self::render_prompt(request),
                )
                .with_temperature(0.4),
            )
            .await?;

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopscout_common::{SearchFilters, StageOutput};

    #[test]
    fn prompt_uses_both_predecessor_outputs() {
        let mut request = StageRequest::new("sony headphones", SearchFilters::default());
        request
            .context
            .push(StageOutput::new(StageKind::Analyze, "analyst", "ANALYSIS TEXT"));
        request
            .context
            .push(StageOutput::new(StageKind::Review, "reviewer", "REVIEW TEXT"));

        let prompt = RecommenderAgent::render_prompt(&request);
        assert!(prompt.contains("ANALYSIS TEXT"));
        assert!(prompt.contains("REVIEW TEXT"));
        assert!(prompt.contains("sony headphones"));
    }

    #[test]
    fn prompt_tolerates_missing_review_context() {
        let mut request = StageRequest::new("sony headphones", SearchFilters::default());
        request
            .context
            .push(StageOutput::new(StageKind::Analyze, "analyst", "ANALYSIS TEXT"));

        let prompt = RecommenderAgent::render_prompt(&request);
        assert!(prompt.contains("no review data available"));
    }
}
