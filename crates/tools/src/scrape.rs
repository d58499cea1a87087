//! Fixed-target site scraping.

use async_trait::async_trait;
use shopscout_common::{Result, ShopScoutError};
use tracing::{debug, warn};

use crate::tool::Tool;

/// Upper bound on the text returned from one scrape. Marketplace landing
/// pages run long and downstream prompts don't need all of it.
const MAX_SCRAPED_CHARS: usize = 20_000;

/// Fetches a page body as a string. The seam exists so scraping tools can
/// be tested against canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Real HTTP fetcher.
pub struct HttpFetcher {
    http_client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .http_client
            .get(url)
            .header("user-agent", "Mozilla/5.0 (compatible; ShopScout/0.2)")
            .send()
            .await
            .map_err(|e| ShopScoutError::Tool(format!("Scrape request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShopScoutError::Tool(format!(
                "Scrape of {url} returned {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ShopScoutError::Tool(format!("Failed to read page body: {e}")))
    }
}

/// Scrape capability bound permanently to one site at construction.
pub struct ScrapeTool {
    site_url: String,
    name: String,
    fetcher: Box<dyn PageFetcher>,
}

impl ScrapeTool {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self::with_fetcher(site_url, Box::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(site_url: impl Into<String>, fetcher: Box<dyn PageFetcher>) -> Self {
        let site_url = site_url.into();
        let host = site_url
            .split("://")
            .nth(1)
            .unwrap_or(&site_url)
            .split('/')
            .next()
            .unwrap_or(&site_url);
        let name = format!("scrape-{host}");
        Self {
            site_url,
            name,
            fetcher,
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Fetch the bound site and reduce it to text.
    pub async fn scrape(&self) -> Result<String> {
        let html = self.fetcher.fetch(&self.site_url).await?;
        let mut text = html_to_text(&html);
        if text.len() > MAX_SCRAPED_CHARS {
            let cut = floor_char_boundary(&text, MAX_SCRAPED_CHARS);
            text.truncate(cut);
        }
        debug!(site = %self.site_url, chars = text.len(), "Scraped site");
        Ok(text)
    }
}

#[async_trait]
impl Tool for ScrapeTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Fetch the bound site and return its visible text"
    }

    async fn invoke(&self, _input: &str) -> Result<String> {
        match self.scrape().await {
            Ok(text) if text.is_empty() => Ok("page had no readable text".into()),
            Ok(text) => Ok(text),
            Err(e) => {
                warn!(site = %self.site_url, error = %e, "Scrape failed, returning degraded output");
                Ok(format!("site unavailable: {e}"))
            }
        }
    }
}

/// Reduce an HTML document to its visible text: drop script/style bodies,
/// strip tags, decode the handful of entities that matter, collapse
/// whitespace.
pub fn html_to_text(html: &str) -> String {
    let without_scripts = strip_element(html, "script");
    let without_styles = strip_element(&without_scripts, "style");

    let mut text = String::with_capacity(without_styles.len() / 4);
    let mut in_tag = false;
    for c in without_styles.chars() {
        match c {
            '<' => {
                in_tag = true;
                // Tag boundaries separate words in the rendered page
                text.push(' ');
            }
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }

    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove `<name ...>...</name>` blocks, case-insensitively.
fn strip_element(html: &str, name: &str) -> String {
    let open = format!("<{name}");
    let close = format!("</{name}>");

    let mut result = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = find_ascii_ci(html, &open, pos) {
        result.push_str(&html[pos..start]);
        match find_ascii_ci(html, &close, start) {
            Some(end) => pos = end + close.len(),
            None => {
                // Unterminated block: drop the rest
                return result;
            }
        }
    }
    result.push_str(&html[pos..]);
    result
}

/// ASCII case-insensitive substring search. The needle must start with an
/// ASCII byte ('<' here), so every match begins on a char boundary.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < from + n.len() {
        return None;
    }
    (from..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
