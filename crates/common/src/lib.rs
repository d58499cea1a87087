//! Common types shared across ShopScout crates.
//!
//! This crate provides the foundational types that the pipeline, agents,
//! tools and API surface use to communicate.

pub mod error;
pub mod filters;
pub mod message;
pub mod stage;
pub mod vendor;

pub use error::{Result, ShopScoutError};
pub use filters::SearchFilters;
pub use message::{MessageRole, Session, SessionMessage};
pub use stage::{StageKind, StageOutput, StageRequest};
pub use vendor::Vendor;
