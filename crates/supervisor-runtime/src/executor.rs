//! Sequential plan execution.
//!
//! Steps run one after another in the order the plan lists them, since a step
//! may consume the output of the one before it. A failing step never stops the
//! run: every step ends up in the report so the synthesizer can tell partial
//! failure from total failure.

use serde_json::Value;
use std::sync::Arc;
use supervisor_core::execution::ExecutionReport;
use supervisor_core::handshake::{new_request_id, AgentResponse, ErrorKind};
use supervisor_core::plan::{InputSource, Plan, PlanStep};
use supervisor_core::registry::AgentRegistry;

use crate::caller::{AgentCaller, AgentInvoker};

pub struct PlanExecutor {
    invoker: Arc<dyn AgentInvoker>,
}

impl Default for PlanExecutor {
    fn default() -> Self {
        Self::new(Arc::new(AgentCaller::new()))
    }
}

impl PlanExecutor {
    pub fn new(invoker: Arc<dyn AgentInvoker>) -> Self {
        Self { invoker }
    }

    pub async fn run(
        &self,
        plan: &Plan,
        registry: &AgentRegistry,
        query: &str,
        context: &Value,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        // Text handed to `previous_step_output` steps; empty after a failure.
        let mut previous_output = String::new();

        for step in &plan.steps {
            let response = self
                .run_step(step, registry, query, &previous_output, context)
                .await;

            previous_output = response
                .output()
                .map(|output| output.result_text())
                .unwrap_or_default();

            tracing::info!(
                step_id = step.step_id,
                agent = %step.agent,
                intent = %step.intent,
                status = %response.status(),
                "Plan step finished"
            );
            report.record(step.step_id, &step.agent, response);
        }

        tracing::debug!(
            steps = plan.steps.len(),
            succeeded = report.answer_inputs.successes().count(),
            "Plan execution complete"
        );
        report
    }

    async fn run_step(
        &self,
        step: &PlanStep,
        registry: &AgentRegistry,
        query: &str,
        previous_output: &str,
        context: &Value,
    ) -> AgentResponse {
        let Some(agent) = registry.get(&step.agent) else {
            tracing::warn!(step_id = step.step_id, agent = %step.agent, "Plan references unknown agent");
            return AgentResponse::error(
                new_request_id(),
                step.agent.clone(),
                ErrorKind::ConfigError,
                format!("agent not found: {}", step.agent),
            );
        };

        let (text, custom_input) = step_input(step, query, previous_output);
        self.invoker
            .invoke(agent, &step.intent, &text, context, custom_input)
            .await
    }
}

/// Resolve the text and optional replacement payload for one step.
///
/// A string literal is sent as the text; any other literal replaces the
/// whole input payload.
fn step_input(step: &PlanStep, query: &str, previous_output: &str) -> (String, Option<Value>) {
    match step.input_source {
        InputSource::UserQuery => (query.to_string(), None),
        InputSource::PreviousStepOutput => (previous_output.to_string(), None),
        InputSource::Literal => match &step.literal {
            Some(Value::String(text)) => (text.clone(), None),
            Some(payload) => (String::new(), Some(payload.clone())),
            None => (String::new(), None),
        },
    }
}
