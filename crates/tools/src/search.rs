//! Generic web search via the Serper REST API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError};
use tracing::{debug, warn};

use crate::tool::Tool;

const SERPER_API_URL: &str = "https://google.serper.dev/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Country code passed to the search provider
    #[serde(default = "default_country")]
    pub country: String,

    /// Maximum results requested per query
    #[serde(default = "default_num_results")]
    pub num_results: u32,
}

fn default_country() -> String {
    "pk".into()
}

fn default_num_results() -> u32 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            country: default_country(),
            num_results: default_num_results(),
        }
    }
}

impl SearchConfig {
    /// Resolve the API key from config or SERPER_API_KEY.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var("SERPER_API_KEY").ok()
    }
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    gl: &'a str,
    num: u32,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
    #[serde(default)]
    shopping: Vec<SerperShopping>,
}

#[derive(Deserialize)]
struct SerperOrganic {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Deserialize)]
struct SerperShopping {
    title: String,
    link: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// One candidate listing, as the search stage hands it downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Site the listing came from, derived from the link host
    pub source: String,
}

impl SearchResult {
    fn render(&self) -> String {
        let price = self.price.as_deref().unwrap_or("price not listed");
        format!(
            "- {} ({price})\n  {}\n  source: {} | {}",
            self.title, self.description, self.source, self.link
        )
    }
}

/// Query-based web search bound to the Serper provider.
pub struct SearchTool {
    config: SearchConfig,
    api_key: String,
    http_client: reqwest::Client,
}

impl SearchTool {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            ShopScoutError::Config("Web search requires an API key (set SERPER_API_KEY)".into())
        })?;
        Ok(Self {
            config,
            api_key,
            http_client: reqwest::Client::new(),
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let body = SerperRequest {
            q: query,
            gl: &self.config.country,
            num: self.config.num_results,
        };

        let response = self
            .http_client
            .post(SERPER_API_URL)
            .header("X-API-KEY", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ShopScoutError::Tool(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ShopScoutError::Tool(format!(
                "Search API error {status}: {body_text}"
            )));
        }

        let serper: SerperResponse = response
            .json()
            .await
            .map_err(|e| ShopScoutError::Tool(format!("Failed to parse search response: {e}")))?;

        let results = Self::collect_results(serper);
        debug!(query = %query, results = results.len(), "Search completed");
        Ok(results)
    }

    fn collect_results(serper: SerperResponse) -> Vec<SearchResult> {
        let mut results = Vec::new();

        for item in serper.shopping {
            let source = item
                .source
                .clone()
                .unwrap_or_else(|| host_of(&item.link).to_string());
            results.push(SearchResult {
                title: item.title,
                description: String::new(),
                price: item.price,
                source,
                link: item.link,
            });
        }

        for item in serper.organic {
            results.push(SearchResult {
                source: host_of(&item.link).to_string(),
                price: extract_price(&item.snippet),
                title: item.title,
                description: item.snippet,
                link: item.link,
            });
        }

        results
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "web-search"
    }

    fn description(&self) -> &str {
        "Search the web for product listings matching a query"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        match self.search(input).await {
            Ok(results) if results.is_empty() => Ok("no listings found".into()),
            Ok(results) => Ok(results
                .iter()
                .map(SearchResult::render)
                .collect::<Vec<_>>()
                .join("\n")),
            // Best effort: a provider failure degrades the stage rather
            // than aborting the run
            Err(e) => {
                warn!(error = %e, "Search tool failed, returning degraded output");
                Ok(format!("search unavailable: {e}"))
            }
        }
    }
}

/// Host part of a URL, without scheme or path.
fn host_of(link: &str) -> &str {
    let after_scheme = link.split("://").nth(1).unwrap_or(link);
    after_scheme.split('/').next().unwrap_or(after_scheme)
}

/// Pull a "Rs. 12,345"-style price out of snippet text, if present.
fn extract_price(text: &str) -> Option<String> {
    let pos = text
        .find("Rs.")
        .or_else(|| text.find("Rs "))
        .or_else(|| text.find("PKR"))?;
    let tail = &text[pos..];
    let end = tail
        .char_indices()
        .skip(3)
        .find(|(_, c)| !c.is_ascii_digit() && *c != ',' && *c != '.' && *c != ' ')
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    let candidate = tail[..end].trim_end_matches([' ', '.']);
    // Require at least one digit so a bare "Rs." is not a price
    candidate
        .chars()
        .any(|c| c.is_ascii_digit())
        .then(|| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serper_response_parses_organic_and_shopping() {
        let raw = r#"{
            "organic": [
                {"title": "Sony WH-1000XM5 - Daraz", "link": "https://www.daraz.pk/p/1", "snippet": "Rs. 89,999 with free delivery"}
            ],
            "shopping": [
                {"title": "Sony WH-1000XM5", "link": "https://priceoye.pk/p/2", "price": "Rs. 87,500", "source": "priceoye.pk"}
            ]
        }"#;
        let parsed: SerperResponse = serde_json::from_str(raw).unwrap();
        let results = SearchTool::collect_results(parsed);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "priceoye.pk");
        assert_eq!(results[0].price.as_deref(), Some("Rs. 87,500"));
        assert_eq!(results[1].source, "www.daraz.pk");
        assert_eq!(results[1].price.as_deref(), Some("Rs. 89,999"));
    }

    #[test]
    fn serper_response_tolerates_missing_sections() {
        let parsed: SerperResponse = serde_json::from_str("{}").unwrap();
        assert!(SearchTool::collect_results(parsed).is_empty());
    }

    #[test]
    fn render_includes_all_listing_fields() {
        let result = SearchResult {
            title: "Sony WH-1000XM5".into(),
            link: "https://www.daraz.pk/p/1".into(),
            description: "Flagship noise cancelling headphones".into(),
            price: Some("Rs. 89,999".into()),
            source: "www.daraz.pk".into(),
        };
        let text = result.render();
        assert!(text.contains("Sony WH-1000XM5"));
        assert!(text.contains("Rs. 89,999"));
        assert!(text.contains("www.daraz.pk"));
        assert!(text.contains("https://www.daraz.pk/p/1"));
    }

    #[test]
    fn host_of_strips_scheme_and_path() {
        assert_eq!(host_of("https://www.daraz.pk/p/123"), "www.daraz.pk");
        assert_eq!(host_of("priceoye.pk/mobiles"), "priceoye.pk");
    }

    #[test]
    fn extract_price_finds_rupee_amounts() {
        assert_eq!(
            extract_price("On sale for Rs. 12,345 today").as_deref(),
            Some("Rs. 12,345")
        );
        assert_eq!(extract_price("no price here"), None);
        assert_eq!(extract_price("Rs. TBD"), None);
    }

    #[test]
    fn search_config_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.country, "pk");
        assert_eq!(config.num_results, 10);
    }
}
