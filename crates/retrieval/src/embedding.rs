//! Embedding generation for vector search using fastembed.

use std::sync::Arc;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tokio::task;
use tracing::{debug, info};

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Failed to generate embeddings: {0}")]
    Generation(String),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Embedding service for generating vector representations.
///
/// The underlying fastembed model is lazy-loaded on first use and shared
/// across all embedding calls.
pub struct EmbeddingService {
    model_name: EmbeddingModel,
    dimension: usize,
    model: OnceCell<Arc<TextEmbedding>>,
}

impl EmbeddingService {
    /// Creates a new embedding service. The model is not loaded until the
    /// first embedding call.
    pub fn new(model_name: EmbeddingModel) -> Self {
        let dimension = match model_name {
            EmbeddingModel::AllMiniLML6V2 | EmbeddingModel::AllMiniLML6V2Q => 384,
            EmbeddingModel::AllMiniLML12V2 | EmbeddingModel::AllMiniLML12V2Q => 384,
            EmbeddingModel::BGESmallENV15 | EmbeddingModel::BGESmallENV15Q => 384,
            EmbeddingModel::BGEBaseENV15 | EmbeddingModel::BGEBaseENV15Q => 768,
            EmbeddingModel::BGELargeENV15 | EmbeddingModel::BGELargeENV15Q => 1024,
            EmbeddingModel::NomicEmbedTextV15 | EmbeddingModel::NomicEmbedTextV15Q => 768,
            EmbeddingModel::MultilingualE5Small => 384,
            EmbeddingModel::MultilingualE5Base => 768,
            EmbeddingModel::MultilingualE5Large => 1024,
            _ => 384,
        };

        Self {
            model_name,
            dimension,
            model: OnceCell::new(),
        }
    }

    /// Creates an embedding service from a model name string.
    pub fn from_model_str(model_name: &str) -> Result<Self, EmbeddingError> {
        let model = match model_name {
            "all-MiniLM-L6-v2" | "AllMiniLML6V2" => EmbeddingModel::AllMiniLML6V2,
            "all-MiniLM-L12-v2" | "AllMiniLML12V2" => EmbeddingModel::AllMiniLML12V2,
            "bge-small-en-v1.5" | "BGESmallENV15" => EmbeddingModel::BGESmallENV15,
            "bge-base-en-v1.5" | "BGEBaseENV15" => EmbeddingModel::BGEBaseENV15,
            "bge-large-en-v1.5" | "BGELargeENV15" => EmbeddingModel::BGELargeENV15,
            "nomic-embed-text-v1.5" | "NomicEmbedTextV15" => EmbeddingModel::NomicEmbedTextV15,
            "multilingual-e5-small" | "MultilingualE5Small" => EmbeddingModel::MultilingualE5Small,
            _ => {
                return Err(EmbeddingError::ModelInit(format!(
                    "Unknown embedding model: '{model_name}'. Supported models: \
                     all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
                     nomic-embed-text-v1.5, multilingual-e5-small"
                )));
            }
        };
        Ok(Self::new(model))
    }

    fn get_or_init_model(&self) -> Result<Arc<TextEmbedding>, EmbeddingError> {
        self.model
            .get_or_try_init(|| {
                info!(model = ?self.model_name, "Initializing embedding model");

                let options =
                    InitOptions::new(self.model_name.clone()).with_show_download_progress(true);
                let model = TextEmbedding::try_new(options)
                    .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

                info!(
                    model = ?self.model_name,
                    dimension = self.dimension,
                    "Embedding model initialized"
                );

                Ok(Arc::new(model))
            })
            .cloned()
    }

    /// Generate an embedding for one text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let model = self.get_or_init_model()?;
        let text = text.to_string();

        // fastembed is synchronous, so run it on the blocking pool
        let embedding = task::spawn_blocking(move || {
            model
                .embed(vec![text], None)
                .map_err(|e| EmbeddingError::Generation(e.to_string()))
        })
        .await??;

        embedding
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Generation("Empty embedding result".into()))
    }

    /// Generate embeddings for multiple texts in one batch.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.get_or_init_model()?;
        let texts: Vec<String> = texts.iter().map(|s| s.to_string()).collect();

        let embeddings = task::spawn_blocking(move || {
            model
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Generation(e.to_string()))
        })
        .await??;

        debug!(
            batch_size = embeddings.len(),
            dimension = embeddings.first().map(|e| e.len()).unwrap_or(0),
            "Generated batch embeddings"
        );

        Ok(embeddings)
    }

    /// Returns the embedding dimension for this model.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Default for EmbeddingService {
    fn default() -> Self {
        Self::new(EmbeddingModel::AllMiniLML6V2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_dimension() {
        let service = EmbeddingService::default();
        assert_eq!(service.dimension(), 384);
    }

    #[test]
    fn from_model_str() {
        assert!(EmbeddingService::from_model_str("all-MiniLM-L6-v2").is_ok());
        assert!(EmbeddingService::from_model_str("bge-base-en-v1.5").is_ok());
        assert!(EmbeddingService::from_model_str("unknown-model").is_err());
    }

    // Downloads the model from the network; run with: cargo test -- --ignored
    #[tokio::test]
    #[ignore = "Downloads model from network, slow"]
    async fn embed_single() {
        let service = EmbeddingService::default();
        let embedding = service.embed("Hello, world!").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!(embedding.iter().any(|&x| x != 0.0));
    }

    #[tokio::test]
    #[ignore = "Downloads model from network, slow"]
    async fn embed_batch_matches_dimension() {
        let service = EmbeddingService::default();
        let embeddings = service
            .embed_batch(&["good sound", "poor battery", "fast delivery"])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 3);
        for emb in &embeddings {
            assert_eq!(emb.len(), 384);
        }
    }
}
