//! Retrieval types and configuration.

use serde::{Deserialize, Serialize};

/// A chunk of scraped page text, with its source URL and (once computed)
/// its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageChunk {
    /// The chunk text
    pub content: String,

    /// URL the chunk was scraped from
    pub source_url: String,

    /// Position of the chunk within its page
    pub ordinal: usize,

    /// Vector embedding (populated by the embedding service)
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
}

impl PageChunk {
    pub fn new(content: impl Into<String>, source_url: impl Into<String>, ordinal: usize) -> Self {
        Self {
            content: content.into(),
            source_url: source_url.into(),
            ordinal,
            embedding: None,
        }
    }
}

/// Configuration for the review retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Target chunk size in characters
    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    /// Number of chunks to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum context tokens handed back to the review stage
    #[serde(default = "default_max_context")]
    pub max_context_tokens: usize,
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".into()
}

fn default_chunk_chars() -> usize {
    800
}

fn default_top_k() -> usize {
    6
}

fn default_max_context() -> usize {
    2048
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            chunk_chars: default_chunk_chars(),
            top_k: default_top_k(),
            max_context_tokens: default_max_context(),
        }
    }
}

/// Split page text into chunks of roughly `chunk_chars` characters,
/// breaking on whitespace so words stay intact.
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > chunk_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
