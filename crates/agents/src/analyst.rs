//! Product analyst - ranks listings and names the winning vendor.

use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, StageKind, StageRequest, Vendor};
use shopscout_llm::{LlmClient, LlmRequest};
use tracing::info;

use crate::traits::{Agent, Persona};

const ROLE: &str = "Product Analyst";
const GOAL: &str = "Analyze product listings for best prices, features, and user ratings.";
const BACKSTORY: &str = "You are a detail-oriented analyst who compares product specs and \
                         reviews to find the top options.";

/// Compares the candidate listings and produces a ranked summary with an
/// explicit winning vendor, drawn from the closed vendor set.
pub struct AnalystAgent {
    persona: Persona,
    llm: Arc<dyn LlmClient>,
}

impl AnalystAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            persona: Persona::new(ROLE, GOAL, BACKSTORY),
            llm,
        }
    }

    fn render_prompt(listings: &str) -> String {
        let vendors = Vendor::ALL
            .iter()
            .map(|v| v.name())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Candidate listings:\n\n{listings}\n\n\
             Analyze these listings and rank the top options by price, ratings, and features. \
             Give pros and cons for each. Finish with a line of the form 'Winner: <vendor>' \
             naming the marketplace with the best overall deal — the vendor must be exactly one \
             of: {vendors}. If the listings are empty or unusable, say so and name no winner.\n\n\
             If the input above is a clarifying question rather than listings, repeat the \
             question unchanged and nothing else."
        )
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn id(&self) -> &str {
        "analyst"
    }

    fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn execute(&self, request: &StageRequest) -> Result<String> {
        let listings = request
            .context_for(StageKind::Search)
            .map(|o| o.text.as_str())
            .unwrap_or("no listings found");

        info!(agent = %self.id(), listings_len = listings.len(), "Analyzing listings");

        let response = self
            .llm
            .complete(
                LlmRequest::single_turn(self.persona.system_prompt(), Self::render_prompt(listings))
                    .with_temperature(0.2),
            )
            .await?;

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_enumerates_every_supported_vendor() {
        let prompt = AnalystAgent::render_prompt("- Sony WH-1000XM5, Rs. 89,999, daraz.pk");
        for vendor in Vendor::ALL {
            assert!(prompt.contains(vendor.name()), "missing {}", vendor.name());
        }
        assert!(prompt.contains("Winner:"));
    }

    #[test]
    fn prompt_embeds_the_listings() {
        let prompt = AnalystAgent::render_prompt("LISTING BLOCK");
        assert!(prompt.contains("LISTING BLOCK"));
    }
}
