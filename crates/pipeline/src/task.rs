//! Task descriptors and the fixed task list.

use serde::{Deserialize, Serialize};
use shopscout_common::{Result, ShopScoutError, StageKind};

/// One pipeline stage descriptor: what to do, who does it, and which
/// prior stages feed it context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Which stage this descriptor defines
    pub stage: StageKind,

    /// Instruction summary for the stage
    pub description: String,

    /// What shape of output the stage is expected to produce
    pub expected_output: String,

    /// Agent that executes the stage
    pub agent_id: String,

    /// Stages whose outputs become this stage's context, in order
    pub context: Vec<StageKind>,
}

impl TaskSpec {
    fn new(
        stage: StageKind,
        agent_id: &str,
        description: &str,
        expected_output: &str,
        context: &[StageKind],
    ) -> Self {
        Self {
            stage,
            description: description.into(),
            expected_output: expected_output.into(),
            agent_id: agent_id.into(),
            context: context.to_vec(),
        }
    }
}

/// The ordered list of pipeline tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    tasks: Vec<TaskSpec>,
}

impl TaskList {
    /// The fixed five-task pipeline.
    pub fn standard() -> Self {
        Self {
            tasks: vec![
                TaskSpec::new(
                    StageKind::Refine,
                    "refiner",
                    "Convert the user's input into a clean, optimized product search query \
                     for online discovery in Pakistan, honoring any active filters.",
                    "A well-formed product search query, or a single clarifying question.",
                    &[],
                ),
                TaskSpec::new(
                    StageKind::Search,
                    "searcher",
                    "Search online for the best matching products using the refined query.",
                    "A list of product listings with title, price, link, description and \
                     source site.",
                    &[StageKind::Refine],
                ),
                TaskSpec::new(
                    StageKind::Analyze,
                    "analyst",
                    "Analyze the listings to find the best options by price, ratings and \
                     features, naming the winning vendor.",
                    "A ranked summary of top deals with pros and cons and an explicit \
                     winning vendor.",
                    &[StageKind::Search],
                ),
                TaskSpec::new(
                    StageKind::Review,
                    "reviewer",
                    "Resolve the winning vendor to its site and summarize customer reviews \
                     for the shortlisted product.",
                    "Pros, cons and overall sentiment in bullet points, or a no-review-data \
                     notice.",
                    &[StageKind::Analyze],
                ),
                TaskSpec::new(
                    StageKind::Recommend,
                    "recommender",
                    "Recommend the best product to the user with reasoning and a purchase \
                     link, weighing both the analysis and the review summary.",
                    "A clear product recommendation with explanation and purchase link.",
                    &[StageKind::Analyze, StageKind::Review],
                ),
            ],
        }
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        &self.tasks
    }

    /// Enforce the pipeline's structural invariants. Violations are
    /// configuration errors raised at startup, before any run exists.
    pub fn validate(&self) -> Result<()> {
        if self.tasks.len() != StageKind::ORDER.len() {
            return Err(ShopScoutError::Config(format!(
                "Pipeline must have exactly {} tasks, found {}",
                StageKind::ORDER.len(),
                self.tasks.len()
            )));
        }

        for (task, expected) in self.tasks.iter().zip(StageKind::ORDER) {
            if task.stage != expected {
                return Err(ShopScoutError::Config(format!(
                    "Task order violation: expected {expected}, found {}",
                    task.stage
                )));
            }
        }

        for (index, task) in self.tasks.iter().enumerate() {
            if index == 0 {
                if !task.context.is_empty() {
                    return Err(ShopScoutError::Config(
                        "First task cannot declare predecessors".into(),
                    ));
                }
                continue;
            }

            if task.context.is_empty() {
                return Err(ShopScoutError::Config(format!(
                    "Task {} must declare at least one predecessor",
                    task.stage
                )));
            }

            let earlier = &self.tasks[..index];
            for dep in &task.context {
                if !earlier.iter().any(|t| t.stage == *dep) {
                    return Err(ShopScoutError::Config(format!(
                        "Task {} depends on {dep}, which does not precede it",
                        task.stage
                    )));
                }
            }
        }

        // The recommendation stage is the one stage with two direct
        // predecessors: the analysis and the review summary.
        let recommend = &self.tasks[self.tasks.len() - 1];
        if recommend.context != [StageKind::Analyze, StageKind::Review] {
            return Err(ShopScoutError::Config(
                "Recommend must take context from analyze and review".into(),
            ));
        }

        Ok(())
    }
}

impl Default for TaskList {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_task_list_is_valid() {
        TaskList::standard().validate().unwrap();
    }

    #[test]
    fn standard_task_list_has_five_tasks_in_order() {
        let list = TaskList::standard();
        assert_eq!(list.tasks().len(), 5);
        let stages: Vec<StageKind> = list.tasks().iter().map(|t| t.stage).collect();
        assert_eq!(stages, StageKind::ORDER);
    }

    #[test]
    fn every_non_first_task_declares_a_predecessor() {
        let list = TaskList::standard();
        for task in &list.tasks()[1..] {
            assert!(!task.context.is_empty(), "{} has no context", task.stage);
        }
    }

    #[test]
    fn recommend_declares_exactly_analysis_and_review() {
        let list = TaskList::standard();
        let recommend = list.tasks().last().unwrap();
        assert_eq!(recommend.context, vec![StageKind::Analyze, StageKind::Review]);
    }

    #[test]
    fn missing_task_fails_validation() {
        let mut list = TaskList::standard();
        list.tasks.pop();
        assert!(list.validate().is_err());
    }

    #[test]
    fn reordered_tasks_fail_validation() {
        let mut list = TaskList::standard();
        list.tasks.swap(1, 2);
        assert!(list.validate().is_err());
    }

    #[test]
    fn dropped_predecessor_fails_validation() {
        let mut list = TaskList::standard();
        list.tasks[2].context.clear();
        assert!(list.validate().is_err());
    }

    #[test]
    fn forward_dependency_fails_validation() {
        let mut list = TaskList::standard();
        list.tasks[1].context = vec![StageKind::Review];
        assert!(list.validate().is_err());
    }
}
