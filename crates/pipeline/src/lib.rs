//! The sequential five-stage shopping pipeline.
//!
//! One user utterance flows through five tasks in a fixed order, each
//! executed by its assigned agent with the textual outputs of its
//! declared predecessors as context:
//!
//! ```text
//! utterance ─▶ refine ─▶ search ─▶ analyze ─▶ review ─▶ recommend ─▶ answer
//!                                     │           ▲  │        ▲
//!                                     └─ vendor ──┘  └────────┤
//!                                        (typed)     analysis + review
//! ```
//!
//! Stage N+1 never starts before stage N's output is available, and no
//! stage reads a successor's output. Failures degrade stage text instead
//! of aborting: the run always reaches the recommendation stage.

pub mod config;
pub mod run;
pub mod task;

pub use config::{REQUIRED_ENV_KEYS, ShopScoutConfig, build_pipeline, require_env};
pub use run::{PipelineInput, PipelineRun, ShoppingPipeline};
pub use task::{TaskList, TaskSpec};
