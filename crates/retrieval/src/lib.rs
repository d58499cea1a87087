//! Embedding-backed retrieval for review mining.
//!
//! The review stage scrapes a vendor site, chunks the page text, embeds
//! the chunks, and answers a product query with the cosine-closest
//! material. Everything lives in memory for the duration of one pipeline
//! run; nothing is persisted between turns.

pub mod embedding;
pub mod index;
pub mod retriever;
pub mod types;

pub use embedding::{EmbeddingError, EmbeddingService};
pub use index::ChunkIndex;
pub use retriever::ReviewRetriever;
pub use types::{PageChunk, RetrievalConfig};
