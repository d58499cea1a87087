//! The fixed registry of pipeline agents.

use std::collections::HashMap;
use std::sync::Arc;

use shopscout_common::{Result, ShopScoutError, Vendor};
use shopscout_llm::LlmClient;
use shopscout_retrieval::{EmbeddingService, RetrievalConfig};
use shopscout_tools::{ReviewSearchTool, ScrapeTool, Tool};
use tracing::info;

use crate::analyst::AnalystAgent;
use crate::recommender::RecommenderAgent;
use crate::refiner::RefinerAgent;
use crate::reviewer::ReviewerAgent;
use crate::searcher::SearcherAgent;
use crate::traits::Agent;

/// The tool bindings handed to web-capable agents.
pub struct ToolSet {
    /// Generic query-based web search
    pub search: Arc<dyn Tool>,

    /// Fixed-target scrape bindings, one per supported vendor site
    pub scrapers: Vec<Arc<dyn Tool>>,

    /// Retrieval-augmented review search, one binding per vendor
    pub review_by_vendor: HashMap<Vendor, Arc<dyn Tool>>,
}

impl ToolSet {
    /// Build the standard tool set: search plus per-vendor scrape and
    /// review bindings derived from `Vendor::ALL`, so the bindings and
    /// the routing table cannot drift apart.
    pub fn standard(
        search: Arc<dyn Tool>,
        embedding: Arc<EmbeddingService>,
        retrieval: RetrievalConfig,
    ) -> Self {
        let scrapers: Vec<Arc<dyn Tool>> = Vendor::ALL
            .iter()
            .map(|v| Arc::new(ScrapeTool::new(v.base_url())) as Arc<dyn Tool>)
            .collect();

        let review_by_vendor: HashMap<Vendor, Arc<dyn Tool>> = Vendor::ALL
            .iter()
            .map(|&v| {
                let tool = ReviewSearchTool::for_vendor(v, embedding.clone(), retrieval.clone());
                (v, Arc::new(tool) as Arc<dyn Tool>)
            })
            .collect();

        Self {
            search,
            scrapers,
            review_by_vendor,
        }
    }
}

/// Holds the five fixed personas, constructed once at startup.
pub struct AgentRegistry {
    agents: HashMap<&'static str, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolSet) -> Result<Self> {
        let mut agents: HashMap<&'static str, Arc<dyn Agent>> = HashMap::new();

        let refiner = RefinerAgent::new(llm.clone());
        let searcher = SearcherAgent::new(llm.clone(), tools.search, tools.scrapers);
        let analyst = AnalystAgent::new(llm.clone());
        let reviewer = ReviewerAgent::new(llm.clone(), tools.review_by_vendor);
        let recommender = RecommenderAgent::new(llm);

        agents.insert("refiner", Arc::new(refiner));
        agents.insert("searcher", Arc::new(searcher));
        agents.insert("analyst", Arc::new(analyst));
        agents.insert("reviewer", Arc::new(reviewer));
        agents.insert("recommender", Arc::new(recommender));

        for agent in agents.values() {
            agent.persona().validate()?;
        }

        info!(agents = agents.len(), "Agent registry constructed");
        Ok(Self { agents })
    }

    /// Build a registry from arbitrary agents. Used by tests and by any
    /// caller that wants to swap an implementation.
    pub fn from_agents(list: Vec<Arc<dyn Agent>>) -> Result<Self> {
        let mut agents: HashMap<&'static str, Arc<dyn Agent>> = HashMap::new();
        for agent in list {
            agent.persona().validate()?;
            let id: &'static str = match agent.id() {
                "refiner" => "refiner",
                "searcher" => "searcher",
                "analyst" => "analyst",
                "reviewer" => "reviewer",
                "recommender" => "recommender",
                other => {
                    return Err(ShopScoutError::Config(format!("Unknown agent id: {other}")));
                }
            };
            agents.insert(id, agent);
        }
        Ok(Self { agents })
    }

    pub fn get(&self, id: &str) -> Result<Arc<dyn Agent>> {
        self.agents
            .get(id)
            .cloned()
            .ok_or_else(|| ShopScoutError::Config(format!("No agent registered as '{id}'")))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
