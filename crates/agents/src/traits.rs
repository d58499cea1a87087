//! The agent seam: persona values and the `Agent` trait.

use async_trait::async_trait;
use shopscout_common::{Result, ShopScoutError, StageRequest};

/// A fixed role definition: who the agent is, what it is for, and how it
/// should behave. Pure value, immutable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Role name, e.g. "Product Analyst"
    pub role: String,

    /// What the agent is trying to achieve
    pub goal: String,

    /// Behavioral framing injected into the system prompt
    pub backstory: String,

    /// Whether the agent may hand work to another agent. Always false in
    /// the fixed pipeline; kept explicit because it is part of the
    /// persona contract.
    pub allow_delegation: bool,
}

impl Persona {
    pub fn new(
        role: impl Into<String>,
        goal: impl Into<String>,
        backstory: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
            allow_delegation: false,
        }
    }

    /// A persona with a missing field is a configuration error, caught at
    /// startup rather than surfacing as a broken prompt at runtime.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("role", &self.role),
            ("goal", &self.goal),
            ("backstory", &self.backstory),
        ] {
            if value.trim().is_empty() {
                return Err(ShopScoutError::Config(format!(
                    "Persona is missing required field '{field}'"
                )));
            }
        }
        Ok(())
    }

    /// Render the persona into a system prompt.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {role}.\n\nGoal: {goal}\n\n{backstory}",
            role = self.role,
            goal = self.goal,
            backstory = self.backstory,
        )
    }
}

/// One pipeline-stage executor.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Stable identifier used by task descriptors, e.g. "analyst".
    fn id(&self) -> &str;

    fn persona(&self) -> &Persona;

    /// Execute one stage. Upstream provider failures should degrade the
    /// output text rather than propagate, unless the agent genuinely
    /// cannot produce anything.
    async fn execute(&self, request: &StageRequest) -> Result<String>;
}
