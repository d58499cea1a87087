//! The sequential pipeline executor.

use serde::{Deserialize, Serialize};
use shopscout_agents::AgentRegistry;
use shopscout_agents::reviewer::NO_REVIEW_DATA;
use shopscout_common::{
    Result, SearchFilters, ShopScoutError, StageKind, StageOutput, StageRequest, Vendor,
};
use tracing::{debug, info, warn};

use crate::task::TaskList;

/// Input to one pipeline run: the utterance and the session's filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineInput {
    pub utterance: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

impl PipelineInput {
    pub fn new(utterance: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// One end-to-end execution for a single utterance. Created per turn and
/// discarded once the result is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// The input utterance
    pub utterance: String,

    /// Per-stage outputs, in execution order
    pub stages: Vec<StageOutput>,

    /// The final raw result: the recommendation stage's text
    pub final_output: String,

    /// Whether any stage produced degraded output
    pub degraded: bool,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

/// Executes the fixed task list over the agent registry, strictly
/// sequentially, feeding each task the outputs of its declared
/// predecessors.
pub struct ShoppingPipeline {
    tasks: TaskList,
    registry: AgentRegistry,
}

impl std::fmt::Debug for ShoppingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShoppingPipeline")
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl ShoppingPipeline {
    /// Build the pipeline, validating the task list and checking that
    /// every task's agent exists. Both are startup configuration errors.
    pub fn new(registry: AgentRegistry) -> Result<Self> {
        let tasks = TaskList::standard();
        tasks.validate()?;

        for task in tasks.tasks() {
            registry.get(&task.agent_id)?;
        }

        Ok(Self { tasks, registry })
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    /// Run the five stages for one utterance.
    ///
    /// Stage failures are absorbed as degraded stage text; the run always
    /// produces exactly one final result.
    pub async fn run(&self, input: PipelineInput) -> Result<PipelineRun> {
        if input.utterance.trim().is_empty() {
            return Err(ShopScoutError::Pipeline("Utterance is empty".into()));
        }

        let start_time = std::time::Instant::now();
        info!(
            utterance = %input.utterance,
            has_filters = !input.filters.is_empty(),
            "Starting pipeline run"
        );

        let mut stages: Vec<StageOutput> = Vec::with_capacity(self.tasks.tasks().len());

        for task in self.tasks.tasks() {
            let step_start = std::time::Instant::now();
            let agent = self.registry.get(&task.agent_id)?;

            let mut request = StageRequest::new(&input.utterance, input.filters.clone());
            for dep in &task.context {
                // Validated at construction: every predecessor has run
                if let Some(output) = stages.iter().find(|o| o.stage == *dep) {
                    request.context.push(output.clone());
                }
            }

            debug!(
                stage = %task.stage,
                agent = %task.agent_id,
                context_stages = request.context.len(),
                "Executing stage"
            );

            let mut output = match agent.execute(&request).await {
                Ok(text) => StageOutput::new(task.stage, &task.agent_id, text),
                Err(e) => {
                    // Best effort: absorb the failure as degraded stage
                    // text so the run still reaches the recommendation.
                    warn!(stage = %task.stage, error = %e, "Stage failed, degrading");
                    StageOutput::new(
                        task.stage,
                        &task.agent_id,
                        format!("{} unavailable: {e}", task.stage),
                    )
                    .degraded()
                }
            };

            output.duration_ms = step_start.elapsed().as_millis() as u64;

            match task.stage {
                StageKind::Search => {
                    if output.text.starts_with("no listings found")
                        || output.text.starts_with("search unavailable")
                    {
                        output.degraded = true;
                    }
                }
                StageKind::Analyze => {
                    // Thread the winning vendor to the review stage as
                    // typed state rather than free text.
                    output.vendor = Vendor::detect(&output.text);
                    if output.vendor.is_none() {
                        debug!(stage = %task.stage, "Analysis named no supported vendor");
                    }
                }
                StageKind::Review => {
                    if output.text.starts_with(NO_REVIEW_DATA) {
                        output.degraded = true;
                    }
                }
                _ => {}
            }

            info!(
                stage = %task.stage,
                degraded = output.degraded,
                duration_ms = output.duration_ms,
                "Stage completed"
            );

            stages.push(output);
        }

        let final_output = stages
            .last()
            .map(|o| o.text.clone())
            .ok_or_else(|| ShopScoutError::Pipeline("Pipeline produced no output".into()))?;

        let degraded = stages.iter().any(|o| o.degraded);

        info!(
            stages = stages.len(),
            degraded,
            duration_ms = start_time.elapsed().as_millis(),
            "Pipeline run completed"
        );

        Ok(PipelineRun {
            utterance: input.utterance,
            stages,
            final_output,
            degraded,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_input_builder() {
        let input = PipelineInput::new("headphones").with_filters(SearchFilters {
            min_rating: Some(4.0),
            preferred_brand: None,
        });
        assert_eq!(input.utterance, "headphones");
        assert_eq!(input.filters.min_rating, Some(4.0));
    }
}
