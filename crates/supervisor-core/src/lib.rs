//! Core data model and capability traits for the agent supervisor.
//! This crate holds the registry, plan and handshake schemas, and the seams
//! (planner, summarization model, conversation store) the runtime composes.
//! It performs no network I/O of its own.

pub mod conversation;
pub mod execution;
pub mod handshake;
pub mod llm;
pub mod messaging;
pub mod plan;
pub mod planner;
pub mod registry;

pub use conversation::{
    ConversationStore, ConversationTurn, InMemoryConversationStore, TurnRole,
    DEFAULT_HISTORY_LIMIT,
};
pub use execution::{ExecutionReport, StepOutputs, UsedAgent};
pub use handshake::{
    AgentOutcome, AgentRequest, AgentResponse, AgentStatus, ErrorKind, ErrorModel, OutputModel,
    ResponseShapeError,
};
pub use llm::{LanguageModel, LlmRequest, LlmResponse};
pub use messaging::{ChatMessage, MessageContent, MessageRole};
pub use plan::{InputSource, Plan, PlanError, PlanStep};
pub use planner::{Planner, StaticPlanner};
pub use registry::{AgentKind, AgentMetadata, AgentRegistry, AgentSpec, RegistryError};
