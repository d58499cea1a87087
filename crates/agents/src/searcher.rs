//! Web searcher - finds candidate listings for the refined query.

use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, StageKind, StageRequest};
use shopscout_llm::{LlmClient, LlmRequest};
use shopscout_tools::Tool;
use tracing::{info, warn};

use crate::traits::{Agent, Persona};

const ROLE: &str = "Web Search Specialist";
const GOAL: &str = "Find relevant and cost-effective product listings across multiple websites.";
const BACKSTORY: &str = "You are a master of online product search, skilled in identifying deals \
                         tailored to user preferences.";

/// Runs the refined query through the generic search capability and has
/// the model structure the raw hits into candidate listings.
pub struct SearcherAgent {
    persona: Persona,
    llm: Arc<dyn LlmClient>,
    search: Arc<dyn Tool>,
    /// Vendor site scrape bindings; listed as capabilities and available
    /// for targeted follow-up, one per supported site.
    scrapers: Vec<Arc<dyn Tool>>,
}

impl SearcherAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: Arc<dyn Tool>, scrapers: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            persona: Persona::new(ROLE, GOAL, BACKSTORY),
            llm,
            search,
            scrapers,
        }
    }

    pub fn capabilities(&self) -> Vec<&str> {
        std::iter::once(self.search.name())
            .chain(self.scrapers.iter().map(|t| t.name()))
            .collect()
    }

    fn render_prompt(query: &str, raw_results: &str) -> String {
        format!(
            "Search results for the query '{query}':\n\n{raw_results}\n\n\
             Produce a list of candidate product listings from these results. For each listing \
             include the title, price (if known), link, a short description, and the source \
             site. Keep only listings that match the query. If nothing matches, say 'no \
             listings found'.\n\nIf the input above is a clarifying question rather than a \
             search query, repeat the question unchanged and nothing else."
        )
    }
}

#[async_trait]
impl Agent for SearcherAgent {
    fn id(&self) -> &str {
        "searcher"
    }

    fn persona(&self) -> &Persona {
        &self.persona
    }

    async fn execute(&self, request: &StageRequest) -> Result<String> {
        // The refined query is the refine stage's output; fall back to the
        // raw utterance if the pipeline ever hands us none.
        let query = request
            .context_for(StageKind::Refine)
            .map(|o| o.text.as_str())
            .unwrap_or(&request.utterance);

        info!(agent = %self.id(), query = %query, "Searching for listings");

        let raw_results = self.search.invoke(query).await?;

        // A degraded tool result passes through unchanged; there is
        // nothing for the model to structure.
        if raw_results.starts_with("no listings found")
            || raw_results.starts_with("search unavailable")
        {
            warn!(agent = %self.id(), "Search degraded: {raw_results}");
            return Ok(raw_results);
        }

        let response = self
            .llm
            .complete(
                LlmRequest::single_turn(
                    self.persona.system_prompt(),
                    Self::render_prompt(query, &raw_results),
                )
                .with_temperature(0.2),
            )
            .await?;

        Ok(response.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopscout_common::{SearchFilters, ShopScoutError, StageOutput};
    use shopscout_llm::LlmResponse;

    struct StaticTool {
        name: &'static str,
        output: String,
    }

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "static"
        }
        async fn invoke(&self, _input: &str) -> Result<String> {
            Ok(self.output.clone())
        }
    }

    struct StaticLlm(String);

    #[async_trait]
    impl LlmClient for StaticLlm {
        async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
            Ok(LlmResponse {
                content: self.0.clone(),
                model: "mock".into(),
                usage: None,
                finish_reason: None,
            })
        }
        fn model_name(&self) -> &str {
            "mock"
        }
    }

    struct PanickingLlm;

    #[async_trait]
    impl LlmClient for PanickingLlm {
        async fn complete(&self, _request: LlmRequest) -> Result<LlmResponse> {
            Err(ShopScoutError::Llm("should not be called".into()))
        }
        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn request_with_refined_query(query: &str) -> StageRequest {
        let mut request = StageRequest::new("headphones", SearchFilters::default());
        request
            .context
            .push(StageOutput::new(StageKind::Refine, "refiner", query));
        request
    }

    #[tokio::test]
    async fn uses_the_refined_query_from_context() {
        let search = Arc::new(StaticTool {
            name: "web-search",
            output: "- Sony WH-1000XM5 (Rs. 89,999)".into(),
        });
        let agent = SearcherAgent::new(
            Arc::new(StaticLlm("1. Sony WH-1000XM5 — Rs. 89,999 — daraz.pk".into())),
            search,
            vec![],
        );

        let request = request_with_refined_query("sony noise cancelling headphones pakistan");
        let output = agent.execute(&request).await.unwrap();
        assert!(output.contains("Sony WH-1000XM5"));
    }

    #[tokio::test]
    async fn degraded_search_skips_the_model() {
        let search = Arc::new(StaticTool {
            name: "web-search",
            output: "no listings found".into(),
        });
        let agent = SearcherAgent::new(Arc::new(PanickingLlm), search, vec![]);

        let request = request_with_refined_query("anything");
        let output = agent.execute(&request).await.unwrap();
        assert_eq!(output, "no listings found");
    }

    #[test]
    fn capabilities_list_search_and_scrapers() {
        let search = Arc::new(StaticTool {
            name: "web-search",
            output: String::new(),
        });
        let scraper = Arc::new(StaticTool {
            name: "scrape-www.daraz.pk",
            output: String::new(),
        });
        let agent = SearcherAgent::new(Arc::new(PanickingLlm), search, vec![scraper]);

        assert_eq!(
            agent.capabilities(),
            vec!["web-search", "scrape-www.daraz.pk"]
        );
    }
}
