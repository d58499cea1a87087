//! Error types for ShopScout.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShopScoutError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShopScoutError>;
