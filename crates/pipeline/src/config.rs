//! Top-level configuration and the fail-fast credential check.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopscout_agents::{AgentRegistry, ToolSet};
use shopscout_common::{Result, ShopScoutError};
use shopscout_llm::{LlmConfig, build_llm_client};
use shopscout_retrieval::{EmbeddingService, RetrievalConfig};
use shopscout_tools::{SearchConfig, SearchTool};
use tracing::info;

/// Credentials that must be present before a pipeline can be built.
/// Voice mode additionally needs the transcription provider's key, which
/// the API layer checks when voice is enabled.
pub const REQUIRED_ENV_KEYS: [&str; 2] = ["GOOGLE_API_KEY", "SERPER_API_KEY"];

/// The explicit configuration object, built once at startup and passed by
/// reference wherever it is needed. No global state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopScoutConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl ShopScoutConfig {
    /// Load configuration from a TOML file. API keys belong in the
    /// environment, not in the file; the file carries models, limits and
    /// retrieval settings.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| ShopScoutError::Config(format!("Invalid config file: {e}")))
    }
}

/// Confirm every named credential is present and non-empty, or fail with
/// an error identifying the first missing key. No retries, no defaults;
/// run once at process start.
pub fn require_env(keys: &[&str]) -> Result<()> {
    for key in keys {
        match std::env::var(key) {
            Ok(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(ShopScoutError::Config(format!(
                    "Required environment variable '{key}' is missing"
                )));
            }
        }
    }
    info!(keys = keys.len(), "All required environment variables are set");
    Ok(())
}

/// Composition root: wire the LLM client, tools and agents into a ready
/// pipeline. Fails fast on any missing credential or invalid persona.
pub fn build_pipeline(config: &ShopScoutConfig) -> Result<crate::run::ShoppingPipeline> {
    require_env(&REQUIRED_ENV_KEYS)?;

    let llm = build_llm_client(&config.llm)?;
    let search = Arc::new(SearchTool::new(config.search.clone())?);
    let embedding = Arc::new(
        EmbeddingService::from_model_str(&config.retrieval.embedding_model)
            .map_err(|e| ShopScoutError::Config(e.to_string()))?,
    );

    let tools = ToolSet::standard(search, embedding, config.retrieval.clone());
    let registry = AgentRegistry::new(llm, tools)?;

    crate::run::ShoppingPipeline::new(registry)
}
