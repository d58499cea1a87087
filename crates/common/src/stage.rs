//! Pipeline stage contract types.
//!
//! A stage receives a structured `StageRequest` (the user utterance, the
//! session filters, and the outputs of its declared predecessor stages)
//! and produces a `StageOutput`. Prompt text is rendered from these
//! values only at the language-model boundary, so the pipeline's internal
//! contract stays free of presentation formatting.

use serde::{Deserialize, Serialize};

use crate::filters::SearchFilters;
use crate::vendor::Vendor;

/// The five pipeline stages, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Refine,
    Search,
    Analyze,
    Review,
    Recommend,
}

impl StageKind {
    /// All stages in execution order.
    pub const ORDER: [StageKind; 5] = [
        StageKind::Refine,
        StageKind::Search,
        StageKind::Analyze,
        StageKind::Review,
        StageKind::Recommend,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Refine => "refine",
            StageKind::Search => "search",
            StageKind::Analyze => "analyze",
            StageKind::Review => "review",
            StageKind::Recommend => "recommend",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured input handed to a stage's agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageRequest {
    /// The raw user utterance for this turn
    pub utterance: String,

    /// The session's current filters (read by the refine stage)
    pub filters: SearchFilters,

    /// Outputs of this stage's declared predecessors, in declaration order
    pub context: Vec<StageOutput>,
}

impl StageRequest {
    pub fn new(utterance: impl Into<String>, filters: SearchFilters) -> Self {
        Self {
            utterance: utterance.into(),
            filters,
            context: Vec::new(),
        }
    }

    /// The output of a specific predecessor, if declared and present.
    pub fn context_for(&self, stage: StageKind) -> Option<&StageOutput> {
        self.context.iter().find(|o| o.stage == stage)
    }

    /// Concatenated predecessor text, labelled per stage.
    pub fn context_text(&self) -> String {
        self.context
            .iter()
            .map(|o| format!("--- {} output ---\n{}", o.stage, o.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The output of one executed stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// Which stage produced this
    pub stage: StageKind,

    /// Agent that executed the stage
    pub agent_id: String,

    /// The stage's textual output
    pub text: String,

    /// Winning vendor, populated by the analyze stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,

    /// Whether this output was produced from incomplete upstream data
    #[serde(default)]
    pub degraded: bool,

    /// Execution time for the stage in milliseconds
    pub duration_ms: u64,
}

impl StageOutput {
    pub fn new(stage: StageKind, agent_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            stage,
            agent_id: agent_id.into(),
            text: text.into(),
            vendor: None,
            degraded: false,
            duration_ms: 0,
        }
    }

    pub fn with_vendor(mut self, vendor: Option<Vendor>) -> Self {
        self.vendor = vendor;
        self
    }

    pub fn degraded(mut self) -> Self {
        self.degraded = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(
            StageKind::ORDER,
            [
                StageKind::Refine,
                StageKind::Search,
                StageKind::Analyze,
                StageKind::Review,
                StageKind::Recommend,
            ]
        );
    }

    #[test]
    fn context_for_finds_declared_predecessor() {
        let mut request = StageRequest::new("headphones", SearchFilters::default());
        request
            .context
            .push(StageOutput::new(StageKind::Analyze, "analyst", "winner: Daraz"));

        assert!(request.context_for(StageKind::Analyze).is_some());
        assert!(request.context_for(StageKind::Search).is_none());
    }

    #[test]
    fn context_text_labels_each_stage() {
        let mut request = StageRequest::new("headphones", SearchFilters::default());
        request
            .context
            .push(StageOutput::new(StageKind::Analyze, "analyst", "analysis here"));
        request
            .context
            .push(StageOutput::new(StageKind::Review, "reviewer", "reviews here"));

        let text = request.context_text();
        assert!(text.contains("--- analyze output ---"));
        assert!(text.contains("analysis here"));
        assert!(text.contains("--- review output ---"));
        assert!(text.contains("reviews here"));
    }

    #[test]
    fn stage_output_builders() {
        let output = StageOutput::new(StageKind::Review, "reviewer", "no review data")
            .with_vendor(None)
            .degraded();
        assert!(output.degraded);
        assert!(output.vendor.is_none());
    }
}
