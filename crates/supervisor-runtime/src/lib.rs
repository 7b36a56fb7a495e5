//! Tokio-powered runtime that runs agent plans and turns their results into
//! one answer. The core pieces are the [`AgentCaller`] (one handshake), the
//! [`PlanExecutor`] (sequential steps) and the [`AnswerSynthesizer`] (tiered
//! answer composition); [`Supervisor`] wires them to a planner and a
//! conversation store.

pub mod caller;
pub mod config;
pub mod executor;
pub mod providers;
pub mod supervisor;
pub mod synthesizer;

pub use caller::{AgentCaller, AgentInvoker};
pub use config::{AgentCallerConfig, SynthesizerConfig};
pub use executor::PlanExecutor;
pub use providers::{OpenAiChatModel, OpenAiConfig};
pub use supervisor::{QueryOutcome, QueryRequest, Supervisor, SupervisorBuilder};
pub use synthesizer::{AnswerSynthesizer, AnswerTier, ComposedAnswer};

pub use supervisor_core;
