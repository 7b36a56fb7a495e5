//! Plans produced by a planner: ordered steps naming an agent and an input source.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Where a step takes the text it hands to its agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    UserQuery,
    PreviousStepOutput,
    Literal,
}

/// One agent invocation inside a [`Plan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanStep {
    pub step_id: u32,
    pub agent: String,
    pub intent: String,
    pub input_source: InputSource,
    /// Payload for `InputSource::Literal` steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<Value>,
}

impl PlanStep {
    pub fn new(
        step_id: u32,
        agent: impl Into<String>,
        intent: impl Into<String>,
        input_source: InputSource,
    ) -> Self {
        Self {
            step_id,
            agent: agent.into(),
            intent: intent.into(),
            input_source,
            literal: None,
        }
    }

    pub fn literal(
        step_id: u32,
        agent: impl Into<String>,
        intent: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            step_id,
            agent: agent.into(),
            intent: intent.into(),
            input_source: InputSource::Literal,
            literal: Some(payload),
        }
    }
}

/// Ordered sequence of steps produced by a planner for a single query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("plan must start at step_id 0, found {0}")]
    BadFirstStep(u32),

    #[error("step_id {current} does not follow {previous}")]
    NotIncreasing { previous: u32, current: u32 },

    #[error("literal step {0} carries no payload")]
    MissingLiteral(u32),
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check the step_id invariants: start at 0, strictly increasing.
    ///
    /// The executor trusts the order it is given, so planners should run this
    /// before handing a plan over.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut previous: Option<u32> = None;
        for step in &self.steps {
            match previous {
                None if step.step_id != 0 => return Err(PlanError::BadFirstStep(step.step_id)),
                Some(prev) if step.step_id <= prev => {
                    return Err(PlanError::NotIncreasing {
                        previous: prev,
                        current: step.step_id,
                    })
                }
                _ => {}
            }
            if step.input_source == InputSource::Literal && step.literal.is_none() {
                return Err(PlanError::MissingLiteral(step.step_id));
            }
            previous = Some(step.step_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_format() {
        let plan: Plan = serde_json::from_value(json!({
            "steps": [
                {"step_id": 0, "agent": "KBAgent", "intent": "update_wiki", "input_source": "user_query"},
                {"step_id": 1, "agent": "Notifier", "intent": "notify", "input_source": "previous_step_output"}
            ]
        }))
        .unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[1].input_source, InputSource::PreviousStepOutput);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn empty_plan_is_valid() {
        assert!(Plan::empty().validate().is_ok());
    }

    #[test]
    fn rejects_plan_not_starting_at_zero() {
        let plan = Plan::new(vec![PlanStep::new(1, "A", "x", InputSource::UserQuery)]);
        assert_eq!(plan.validate(), Err(PlanError::BadFirstStep(1)));
    }

    #[test]
    fn rejects_repeated_step_ids() {
        let plan = Plan::new(vec![
            PlanStep::new(0, "A", "x", InputSource::UserQuery),
            PlanStep::new(0, "B", "y", InputSource::UserQuery),
        ]);
        assert_eq!(
            plan.validate(),
            Err(PlanError::NotIncreasing {
                previous: 0,
                current: 0
            })
        );
    }

    #[test]
    fn rejects_literal_step_without_payload() {
        let plan = Plan::new(vec![PlanStep::new(0, "A", "x", InputSource::Literal)]);
        assert_eq!(plan.validate(), Err(PlanError::MissingLiteral(0)));
    }

    #[test]
    fn gaps_in_step_ids_are_allowed() {
        let plan = Plan::new(vec![
            PlanStep::new(0, "A", "x", InputSource::UserQuery),
            PlanStep::literal(3, "B", "y", json!("fixed")),
        ]);
        assert!(plan.validate().is_ok());
    }
}
