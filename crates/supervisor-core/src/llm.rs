use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::messaging::{ChatMessage, MessageContent};

/// Minimal request structure passed to a language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
}

impl LlmRequest {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub message: ChatMessage,
}

impl LlmResponse {
    pub fn text(&self) -> String {
        match &self.message.content {
            MessageContent::Text(text) => text.clone(),
            other => other.to_prompt_string(),
        }
    }
}

/// Summarization backend. Callers treat every result as advisory.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse>;
}
