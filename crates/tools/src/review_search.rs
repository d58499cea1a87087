//! Retrieval-augmented site search for review mining.

use std::sync::Arc;

use async_trait::async_trait;
use shopscout_common::{Result, ShopScoutError, Vendor};
use shopscout_retrieval::{EmbeddingService, RetrievalConfig, ReviewRetriever};
use tracing::{debug, warn};

use crate::scrape::{HttpFetcher, PageFetcher};
use crate::tool::Tool;

/// Site search backed by embedding retrieval, bound to one vendor site.
///
/// Invoking it scrapes the bound site, indexes the text, and returns the
/// chunks closest to the query. The review stage constructs one of these
/// after resolving the winning vendor; the embedding service is shared.
pub struct ReviewSearchTool {
    site_url: String,
    name: String,
    fetcher: Arc<dyn PageFetcher>,
    retriever: ReviewRetriever,
}

impl ReviewSearchTool {
    pub fn for_vendor(
        vendor: Vendor,
        embedding: Arc<EmbeddingService>,
        config: RetrievalConfig,
    ) -> Self {
        Self::for_site(
            vendor.base_url(),
            Arc::new(HttpFetcher::new()),
            embedding,
            config,
        )
    }

    pub fn for_site(
        site_url: impl Into<String>,
        fetcher: Arc<dyn PageFetcher>,
        embedding: Arc<EmbeddingService>,
        config: RetrievalConfig,
    ) -> Self {
        let site_url = site_url.into();
        Self {
            name: format!("review-search-{}", host_of(&site_url)),
            site_url,
            fetcher,
            retriever: ReviewRetriever::new(embedding, config),
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Scrape the bound site and answer `query` with the closest material.
    pub async fn mine(&self, query: &str) -> Result<String> {
        let html = self.fetcher.fetch(&self.site_url).await?;
        let text = crate::scrape::html_to_text(&html);
        if text.is_empty() {
            return Err(ShopScoutError::Tool(format!(
                "{} had no readable text",
                self.site_url
            )));
        }

        let ingested = self.retriever.ingest(&text, &self.site_url).await?;
        debug!(site = %self.site_url, chunks = ingested, "Indexed review material");

        let context = self.retriever.build_context(query).await?;
        if context.is_empty() {
            return Err(ShopScoutError::Tool(format!(
                "no review material matched '{query}' on {}",
                self.site_url
            )));
        }
        Ok(context)
    }
}

#[async_trait]
impl Tool for ReviewSearchTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Retrieve review snippets from the bound vendor site"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        match self.mine(input).await {
            Ok(context) => Ok(context),
            Err(e) => {
                warn!(site = %self.site_url, error = %e, "Review search failed, returning degraded output");
                Ok(format!("no review data available: {e}"))
            }
        }
    }
}

fn host_of(url: &str) -> &str {
    let after_scheme = url.split("://").nth(1).unwrap_or(url);
    after_scheme.split('/').next().unwrap_or(after_scheme)
}
