//! Review-context retrieval over scraped page text.

use std::sync::Arc;

use shopscout_common::{Result, ShopScoutError};
use tracing::debug;

use crate::embedding::EmbeddingService;
use crate::index::ChunkIndex;
use crate::types::{PageChunk, RetrievalConfig, chunk_text};

/// Retrieves and formats review material for the review stage.
///
/// Feed it scraped page text with `ingest`, then ask for a query-shaped
/// context with `build_context`. The context is bounded by the configured
/// token budget so it fits alongside the review prompt.
pub struct ReviewRetriever {
    embedding: Arc<EmbeddingService>,
    index: ChunkIndex,
    config: RetrievalConfig,
}

impl ReviewRetriever {
    pub fn new(embedding: Arc<EmbeddingService>, config: RetrievalConfig) -> Self {
        Self {
            embedding,
            index: ChunkIndex::new(),
            config,
        }
    }

    /// Chunk, embed and index one page's text.
    pub async fn ingest(&self, text: &str, source_url: &str) -> Result<usize> {
        let pieces = chunk_text(text, self.config.chunk_chars);
        if pieces.is_empty() {
            return Ok(0);
        }

        let refs: Vec<&str> = pieces.iter().map(String::as_str).collect();
        let embeddings = self
            .embedding
            .embed_batch(&refs)
            .await
            .map_err(|e| ShopScoutError::Retrieval(e.to_string()))?;

        let chunks: Vec<PageChunk> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(ordinal, (content, embedding))| {
                let mut chunk = PageChunk::new(content, source_url, ordinal);
                chunk.embedding = Some(embedding);
                chunk
            })
            .collect();

        let count = chunks.len();
        self.index.add(chunks).await;

        debug!(source_url = %source_url, chunks = count, "Ingested page");
        Ok(count)
    }

    /// Build a bounded context of the indexed material closest to `query`.
    /// Returns an empty string when nothing has been ingested.
    pub async fn build_context(&self, query: &str) -> Result<String> {
        if self.index.is_empty().await {
            return Ok(String::new());
        }

        let query_embedding = self
            .embedding
            .embed(query)
            .await
            .map_err(|e| ShopScoutError::Retrieval(e.to_string()))?;

        let hits = self.index.search(&query_embedding, self.config.top_k).await;

        let mut parts = Vec::new();
        let mut token_count = 0;
        for chunk in &hits {
            let part = format!("[{}] {}", chunk.source_url, chunk.content);
            let tokens = estimate_tokens(&part);
            if token_count + tokens > self.config.max_context_tokens {
                break;
            }
            parts.push(part);
            token_count += tokens;
        }

        debug!(
            hits = hits.len(),
            used = parts.len(),
            estimated_tokens = token_count,
            "Built review context"
        );

        Ok(parts.join("\n\n"))
    }

    /// Drop everything ingested so far.
    pub async fn clear(&self) {
        self.index.clear().await;
    }
}

/// Rough token estimate: ~4 characters per token.
fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_is_roughly_chars_over_four() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[tokio::test]
    async fn empty_retriever_builds_empty_context() {
        let retriever =
            ReviewRetriever::new(Arc::new(EmbeddingService::default()), RetrievalConfig::default());
        // build_context must not touch the (unloaded) model when the
        // index is empty
        let context = retriever.build_context("battery life").await.unwrap();
        assert!(context.is_empty());
    }

    // Downloads the model from the network; run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore = "Downloads model from network, slow"]
    async fn ingest_then_retrieve() {
        let retriever =
            ReviewRetriever::new(Arc::new(EmbeddingService::default()), RetrievalConfig::default());

        retriever
            .ingest(
                "Customers praise the noise cancellation. Several reviews complain \
                 the ear cushions wear out quickly. Battery easily lasts 30 hours.",
                "https://www.daraz.pk/headphones",
            )
            .await
            .unwrap();

        let context = retriever.build_context("battery life").await.unwrap();
        assert!(context.contains("daraz.pk"));
        assert!(!context.is_empty());
    }
}
