//! Final answer synthesis.
//!
//! The answer degrades through four tiers: nothing ran, everything failed,
//! stitched raw results (no backend), and a model-written summary. Backend
//! failures fall back to the stitched answer and are never surfaced.

use serde_json::{json, Value};
use std::sync::Arc;
use supervisor_core::conversation::ConversationTurn;
use supervisor_core::execution::StepOutputs;
use supervisor_core::llm::{LanguageModel, LlmRequest};
use supervisor_core::messaging::ChatMessage;

use crate::config::SynthesizerConfig;
use crate::providers::{OpenAiChatModel, OpenAiConfig};

pub const OUT_OF_SCOPE_ANSWER: &str = "This information is not in my scope.";
pub const ALL_FAILED_ANSWER: &str =
    "I could not complete your request because every tool failed. Please try again.";
pub const STITCH_LEAD_IN: &str = "Based on the tools, here is what I found: ";
pub const STITCH_SEPARATOR: &str = " | ";
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful assistant. Given the user's query and \
tool outputs, write a concise, actionable answer.";

/// Which strategy produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerTier {
    OutOfScope,
    AllFailed,
    Stitched,
    Summarized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedAnswer {
    pub text: String,
    pub tier: AnswerTier,
}

#[derive(Clone, Default)]
pub struct AnswerSynthesizer {
    backend: Option<Arc<dyn LanguageModel>>,
}

impl AnswerSynthesizer {
    /// Synthesizer with no summarization backend.
    pub fn offline() -> Self {
        Self { backend: None }
    }

    pub fn with_backend(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            backend: Some(model),
        }
    }

    /// A missing key or a client that fails to build yields an offline synthesizer.
    pub fn from_config(config: SynthesizerConfig) -> Self {
        let Some(api_key) = config.api_key else {
            tracing::debug!("No summarization API key configured, answers will be stitched");
            return Self::offline();
        };

        let model_config = OpenAiConfig::new(api_key, config.model)
            .with_api_url(Some(config.api_url))
            .with_timeout(config.timeout);
        match OpenAiChatModel::new(model_config) {
            Ok(model) => Self::with_backend(Arc::new(model)),
            Err(err) => {
                tracing::warn!(error = %err, "Summarization client unavailable, answers will be stitched");
                Self::offline()
            }
        }
    }

    pub fn from_env() -> Self {
        Self::from_config(SynthesizerConfig::from_env())
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn compose(
        &self,
        query: &str,
        step_outputs: &StepOutputs,
        recent_history: Option<&[ConversationTurn]>,
    ) -> String {
        self.compose_detailed(query, step_outputs, recent_history)
            .await
            .text
    }

    pub async fn compose_detailed(
        &self,
        query: &str,
        step_outputs: &StepOutputs,
        recent_history: Option<&[ConversationTurn]>,
    ) -> ComposedAnswer {
        if step_outputs.is_empty() {
            return answer(OUT_OF_SCOPE_ANSWER.to_string(), AnswerTier::OutOfScope);
        }
        if step_outputs.successes().next().is_none() {
            return answer(ALL_FAILED_ANSWER.to_string(), AnswerTier::AllFailed);
        }

        let stitched = stitch(step_outputs);
        let Some(backend) = &self.backend else {
            return answer(stitched, AnswerTier::Stitched);
        };

        let request = LlmRequest::new(
            SUMMARY_SYSTEM_PROMPT,
            vec![ChatMessage::user_json(summary_payload(
                query,
                step_outputs,
                recent_history,
            ))],
        );

        match backend.generate(request).await {
            Ok(response) => {
                let text = response.text().trim().to_string();
                if text.is_empty() {
                    tracing::warn!("Summarization backend returned an empty answer, using stitched results");
                    answer(stitched, AnswerTier::Stitched)
                } else {
                    answer(text, AnswerTier::Summarized)
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "Summarization failed, using stitched results");
                answer(stitched, AnswerTier::Stitched)
            }
        }
    }
}

fn answer(text: String, tier: AnswerTier) -> ComposedAnswer {
    tracing::info!(?tier, "Composed final answer");
    ComposedAnswer { text, tier }
}

/// Successful results in ascending step_id, joined behind the fixed lead-in.
pub fn stitch(step_outputs: &StepOutputs) -> String {
    let results: Vec<String> = step_outputs
        .successes()
        .filter_map(|response| response.output())
        .map(|output| output.result_text())
        .collect();
    format!("{STITCH_LEAD_IN}{}", results.join(STITCH_SEPARATOR))
}

/// User message for the summarization backend: the query, every step's
/// findings (failures included), and recent turns when available.
pub fn summary_payload(
    query: &str,
    step_outputs: &StepOutputs,
    recent_history: Option<&[ConversationTurn]>,
) -> Value {
    let findings: Vec<Value> = step_outputs
        .responses()
        .map(|response| {
            let output = response.output();
            json!({
                "agent": response.agent_name,
                "status": response.status(),
                "result": output.map(|o| o.result.clone()),
                "details": output.and_then(|o| o.details.clone()),
            })
        })
        .collect();

    let mut payload = json!({
        "user_query": query,
        "tool_outputs": findings,
    });
    if let Some(history) = recent_history.filter(|h| !h.is_empty()) {
        payload["recent_history"] = json!(history);
    }
    payload
}
