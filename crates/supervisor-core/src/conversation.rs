//! Per-conversation turn history.
//!
//! The in-memory store lives as long as the process and never evicts. A
//! durable backend only has to implement the two operations of
//! [`ConversationStore`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of turns the supervisor feeds back into synthesis by default.
pub const DEFAULT_HISTORY_LIMIT: i64 = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only turn log keyed by conversation id.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Add one turn at the end of the conversation, creating it on first use.
    async fn append(&self, conversation_id: &str, role: TurnRole, content: &str)
        -> anyhow::Result<()>;

    /// Last `limit` turns oldest first, or every turn when `limit <= 0`.
    /// Unknown conversations read as empty.
    async fn read(&self, conversation_id: &str, limit: i64)
        -> anyhow::Result<Vec<ConversationTurn>>;
}

/// Process-lifetime conversation store guarded by a lock.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: std::sync::RwLock<HashMap<String, Vec<ConversationTurn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn append(
        &self,
        conversation_id: &str,
        role: TurnRole,
        content: &str,
    ) -> anyhow::Result<()> {
        let mut conversations = self.conversations.write().map_err(|_| {
            anyhow::anyhow!("Failed to acquire write lock on in-memory conversation store")
        })?;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(ConversationTurn {
                role,
                content: content.to_string(),
            });
        tracing::debug!(conversation_id = %conversation_id, ?role, "Appended conversation turn");
        Ok(())
    }

    async fn read(&self, conversation_id: &str, limit: i64) -> anyhow::Result<Vec<ConversationTurn>> {
        let conversations = self.conversations.read().map_err(|_| {
            anyhow::anyhow!("Failed to acquire read lock on in-memory conversation store")
        })?;
        let Some(turns) = conversations.get(conversation_id) else {
            return Ok(Vec::new());
        };
        if limit <= 0 {
            return Ok(turns.clone());
        }
        let keep = usize::try_from(limit).unwrap_or(usize::MAX);
        let start = turns.len().saturating_sub(keep);
        Ok(turns[start..].to_vec())
    }
}
