//! Tool capabilities for ShopScout agents.
//!
//! Tools are opaque collaborators from the pipeline's point of view:
//! text in, text out. Failures surface as error strings or empty results,
//! never as panics, so a failed tool degrades a stage instead of killing
//! the run.

pub mod review_search;
pub mod scrape;
pub mod search;
pub mod tool;

pub use review_search::ReviewSearchTool;
pub use scrape::{HttpFetcher, PageFetcher, ScrapeTool, html_to_text};
pub use search::{SearchConfig, SearchResult, SearchTool};
pub use tool::Tool;
