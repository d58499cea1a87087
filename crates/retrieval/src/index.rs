//! In-memory chunk index with cosine ranking.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::types::PageChunk;

/// Holds embedded page chunks for one retrieval session and answers
/// nearest-neighbour queries by cosine similarity.
///
/// The index is small (one vendor site's worth of chunks) so a linear
/// scan is all the structure this needs.
#[derive(Default)]
pub struct ChunkIndex {
    chunks: Arc<RwLock<Vec<PageChunk>>>,
}

impl ChunkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add embedded chunks to the index. Chunks without an embedding are
    /// skipped; they cannot be ranked.
    pub async fn add(&self, chunks: Vec<PageChunk>) {
        let mut store = self.chunks.write().await;
        let before = store.len();
        store.extend(chunks.into_iter().filter(|c| c.embedding.is_some()));
        debug!(added = store.len() - before, total = store.len(), "Indexed chunks");
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// Return the `top_k` chunks closest to the query embedding,
    /// best first.
    pub async fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<PageChunk> {
        let store = self.chunks.read().await;

        let mut scored: Vec<(f32, &PageChunk)> = store
            .iter()
            .filter_map(|chunk| {
                chunk
                    .embedding
                    .as_deref()
                    .map(|emb| (cosine_similarity(query_embedding, emb), chunk))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(top_k)
            .map(|(_, chunk)| chunk.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.chunks.write().await.clear();
    }
}

/// Cosine similarity between two vectors. Zero-magnitude vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
