//! Review analyzer - mines the winning vendor's site for sentiment.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, StageKind, StageRequest, Vendor};
use shopscout_llm::{LlmClient, LlmRequest};
use shopscout_tools::Tool;
use tracing::{info, warn};

use crate::traits::{Agent, Persona};

const ROLE: &str = "Review Analyzer";
const GOAL: &str = "Analyze customer reviews to extract common sentiments, pros, and cons.";
const BACKSTORY: &str = "You are a sentiment-focused analyst who uses retrieval over vendor \
                         sites to summarize public opinion about products.";

/// Text returned when no vendor resolved or its site yielded nothing.
/// The run continues to the recommendation stage with this as context.
pub const NO_REVIEW_DATA: &str = "no review data available";

/// Resolves the analysis stage's winning vendor to its site and mines it
/// for review sentiment via the retrieval-augmented search tool.
///
/// The tool map is built from `Vendor::ALL` at construction, so every
/// vendor in the routing table has a binding and nothing else does.
pub struct ReviewerAgent {
    persona: Persona,
    llm: Arc<dyn LlmClient>,
    review_tools: HashMap<Vendor, Arc<dyn Tool>>,
}

impl ReviewerAgent {
    pub fn new(llm: Arc<dyn LlmClient>, review_tools: HashMap<Vendor, Arc<dyn Tool>>) -> Self {
        Self {
            persona: Persona::new(ROLE, GOAL, BACKSTORY),
            llm,
            review_tools,
        }
    }

    /// The site a vendor resolves to, if a binding exists for it.
    pub fn resolve(&self, vendor: Vendor) -> Option<&Arc<dyn Tool>> {
        self.review_tools.get(&vendor)
    }

    fn render_prompt(analysis: &str, review_material: &str) -> String {
        format!(
            "Product analysis:\n\n{analysis}\n\n\
             Review material retrieved from the vendor site:\n\n{review_material}\n\n\
             Summarize the customer sentiment for the winning product as bullet points: \
             pros, cons, and the overall sentiment. Base the summary only on the material \
             above."
        )
    }
}

#[async_trait]
impl Agent for ReviewerAgent {
    fn id(&self) -> &str {
        "reviewer"
    }

    fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn execute(&self, request: &StageRequest) -> Result<String> {
        let analysis = match request.context_for(StageKind::Analyze) {
            Some(output) => output,
            None => {
                warn!(agent = %self.id(), "No analysis context; degrading");
                return Ok(NO_REVIEW_DATA.to_string());
            }
        };

        // The vendor identifier is the typed state threaded from the
        // analysis stage; outside the closed set it is already None.
        let Some(vendor) = analysis.vendor else {
            info!(agent = %self.id(), "Analysis named no supported vendor; degrading");
            return Ok(NO_REVIEW_DATA.to_string());
        };

        let Some(tool) = self.resolve(vendor) else {
            // Unreachable when the map is built from Vendor::ALL, but a
            // missing binding must degrade, not crash.
            warn!(agent = %self.id(), vendor = %vendor, "No review binding for vendor");
            return Ok(NO_REVIEW_DATA.to_string());
        };

        info!(agent = %self.id(), vendor = %vendor, "Mining reviews");

        let review_material = tool.invoke(&request.utterance).await?;
        if review_material.starts_with(NO_REVIEW_DATA) {
            return Ok(review_material);
        }

        let response = self
            .llm
            .complete(
                LlmRequest::single_turn(
                    self.persona.system_prompt(),
                    Self::render_prompt(&analysis.text, &review_material),
                )
                .with_temperature(0.2),
            )
            .await?;

        Ok(response.content.trim().to_string())
    }
}
