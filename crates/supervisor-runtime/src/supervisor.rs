//! One query, end to end: plan, execute, compose, record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use supervisor_core::conversation::{
    ConversationStore, ConversationTurn, InMemoryConversationStore, TurnRole,
    DEFAULT_HISTORY_LIMIT,
};
use supervisor_core::execution::{StepOutputs, UsedAgent};
use supervisor_core::plan::Plan;
use supervisor_core::planner::Planner;
use supervisor_core::registry::AgentRegistry;

use crate::caller::{AgentCaller, AgentInvoker};
use crate::executor::PlanExecutor;
use crate::synthesizer::{AnswerSynthesizer, AnswerTier};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Opaque context forwarded to every agent call.
    #[serde(default = "empty_context")]
    pub context: Value,
}

fn empty_context() -> Value {
    Value::Object(Default::default())
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            conversation_id: None,
            context: empty_context(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub used_agents: Vec<UsedAgent>,
    pub intermediate_results: StepOutputs,
    #[serde(skip)]
    pub tier: AnswerTier,
}

/// Wires a planner, executor, synthesizer and conversation store together.
pub struct Supervisor {
    registry: Arc<AgentRegistry>,
    planner: Arc<dyn Planner>,
    executor: PlanExecutor,
    synthesizer: AnswerSynthesizer,
    store: Arc<dyn ConversationStore>,
    history_limit: i64,
}

impl Supervisor {
    pub fn builder(registry: AgentRegistry) -> SupervisorBuilder {
        SupervisorBuilder::new(registry)
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn conversation_store(&self) -> Arc<dyn ConversationStore> {
        self.store.clone()
    }

    /// Handle one query. Every failure below this point is folded into the
    /// answer; the only visible symptom is one of the fixed apology strings.
    pub async fn handle(&self, request: QueryRequest) -> QueryOutcome {
        let history = match &request.conversation_id {
            Some(id) => self.recent_history(id).await,
            None => Vec::new(),
        };

        let plan = self.plan_for(&request.query);
        let report = self
            .executor
            .run(&plan, &self.registry, &request.query, &request.context)
            .await;

        let history_ref = (!history.is_empty()).then_some(history.as_slice());
        let composed = self
            .synthesizer
            .compose_detailed(&request.query, &report.answer_inputs, history_ref)
            .await;

        if let Some(id) = &request.conversation_id {
            self.record_turn(id, TurnRole::User, &request.query).await;
            self.record_turn(id, TurnRole::Assistant, &composed.text).await;
        }

        QueryOutcome {
            answer: composed.text,
            used_agents: report.used_agents,
            intermediate_results: report.answer_inputs,
            tier: composed.tier,
        }
    }

    fn plan_for(&self, query: &str) -> Plan {
        let plan = match self.planner.plan(query, &self.registry) {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(error = %err, "Planner failed, continuing with an empty plan");
                return Plan::empty();
            }
        };
        if let Err(err) = plan.validate() {
            tracing::warn!(error = %err, "Planner produced an invalid plan, continuing with an empty plan");
            return Plan::empty();
        }
        tracing::debug!(steps = plan.len(), "Planned query");
        plan
    }

    async fn recent_history(&self, conversation_id: &str) -> Vec<ConversationTurn> {
        match self.store.read(conversation_id, self.history_limit).await {
            Ok(turns) => turns,
            Err(err) => {
                tracing::warn!(conversation_id = %conversation_id, error = %err, "Failed to read conversation history");
                Vec::new()
            }
        }
    }

    async fn record_turn(&self, conversation_id: &str, role: TurnRole, content: &str) {
        if let Err(err) = self.store.append(conversation_id, role, content).await {
            tracing::warn!(conversation_id = %conversation_id, error = %err, "Failed to record conversation turn");
        }
    }
}

/// Fluent construction for [`Supervisor`]. Only the planner is mandatory.
pub struct SupervisorBuilder {
    registry: AgentRegistry,
    planner: Option<Arc<dyn Planner>>,
    invoker: Option<Arc<dyn AgentInvoker>>,
    synthesizer: Option<AnswerSynthesizer>,
    store: Option<Arc<dyn ConversationStore>>,
    history_limit: i64,
}

impl SupervisorBuilder {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            planner: None,
            invoker: None,
            synthesizer: None,
            store: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// Replace the default [`AgentCaller`].
    pub fn with_invoker(mut self, invoker: Arc<dyn AgentInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Defaults to [`AnswerSynthesizer::from_env`].
    pub fn with_synthesizer(mut self, synthesizer: AnswerSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Defaults to a fresh [`InMemoryConversationStore`].
    pub fn with_conversation_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Turns fed back into synthesis; `<= 0` means the whole conversation.
    pub fn with_history_limit(mut self, limit: i64) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn build(self) -> anyhow::Result<Supervisor> {
        let planner = self
            .planner
            .ok_or_else(|| anyhow::anyhow!("a planner is required to build a supervisor"))?;
        let invoker: Arc<dyn AgentInvoker> = match self.invoker {
            Some(invoker) => invoker,
            None => Arc::new(AgentCaller::new()),
        };
        let store: Arc<dyn ConversationStore> = match self.store {
            Some(store) => store,
            None => Arc::new(InMemoryConversationStore::new()),
        };

        Ok(Supervisor {
            registry: Arc::new(self.registry),
            planner,
            executor: PlanExecutor::new(invoker),
            synthesizer: self.synthesizer.unwrap_or_else(AnswerSynthesizer::from_env),
            store,
            history_limit: self.history_limit,
        })
    }
}
