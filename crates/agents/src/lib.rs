//! Role-specialized agents for the ShopScout pipeline.
//!
//! Each pipeline stage is executed by one fixed persona:
//!
//! - **Input Refiner**: turns a raw utterance (plus filters) into a search query
//! - **Web Searcher**: finds candidate listings via search and scrape tools
//! - **Product Analyst**: ranks listings and names the winning vendor
//! - **Review Analyzer**: mines the winning vendor's site for review sentiment
//! - **Recommender**: writes the final recommendation with a purchase link
//!
//! # Architecture
//!
//! ```text
//! utterance ──▶ Refiner ──▶ Searcher ──▶ Analyst ──▶ Reviewer ──▶ Recommender
//!                              │                        │              │
//!                         [search/scrape]        [review RAG per   (analysis +
//!                                                 winning vendor)   review ctx)
//! ```
//!
//! Agents are pure values after construction: a persona, a shared
//! read-only LLM handle, and an optional tool set. Nothing is mutated
//! between runs.

pub mod analyst;
pub mod recommender;
pub mod refiner;
pub mod registry;
pub mod reviewer;
pub mod searcher;
pub mod traits;

pub use analyst::AnalystAgent;
pub use recommender::RecommenderAgent;
pub use refiner::RefinerAgent;
pub use registry::{AgentRegistry, ToolSet};
pub use reviewer::ReviewerAgent;
pub use searcher::SearcherAgent;
pub use traits::{Agent, Persona};
