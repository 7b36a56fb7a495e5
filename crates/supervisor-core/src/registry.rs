//! Static description of the agents a supervisor can call.
//!
//! Agents are declared as loosely typed [`AgentSpec`] records (usually read
//! from JSON) and validated once into [`AgentMetadata`]. After load the
//! registry is immutable and can be shared across queries behind an `Arc`
//! without any locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Timeout applied when an agent declaration omits `timeout_ms`.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Agent declaration as it appears in a registry file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub agent_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl AgentSpec {
    pub fn http(name: impl Into<String>, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            name: name.into(),
            agent_type: "http".to_string(),
            endpoint: Some(endpoint.into()),
            timeout_ms,
            description: None,
        }
    }

    pub fn cli(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_type: "cli".to_string(),
            endpoint: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Transport an agent is reached through, resolved at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentKind {
    /// JSON handshake POSTed to `endpoint`.
    Http { endpoint: String, timeout_ms: u64 },
    /// Recognized but not executable yet.
    Cli,
    /// Declared but missing what its transport needs (or an unknown type).
    Unconfigured { reason: String },
}

impl AgentKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            AgentKind::Http { .. } => "http",
            AgentKind::Cli => "cli",
            AgentKind::Unconfigured { .. } => "unconfigured",
        }
    }
}

/// Validated, immutable description of one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMetadata {
    pub name: String,
    pub kind: AgentKind,
    pub description: Option<String>,
}

impl AgentMetadata {
    pub fn http(name: impl Into<String>, endpoint: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            name: name.into(),
            kind: AgentKind::Http {
                endpoint: endpoint.into(),
                timeout_ms,
            },
            description: None,
        }
    }

    pub fn cli(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AgentKind::Cli,
            description: None,
        }
    }

    pub fn unconfigured(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AgentKind::Unconfigured {
                reason: reason.into(),
            },
            description: None,
        }
    }

    fn from_spec(spec: AgentSpec) -> Result<Self, RegistryError> {
        if spec.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if spec.timeout_ms == 0 {
            return Err(RegistryError::InvalidTimeout { agent: spec.name });
        }

        let kind = match spec.agent_type.as_str() {
            "http" => match spec.endpoint.filter(|e| !e.trim().is_empty()) {
                Some(endpoint) => AgentKind::Http {
                    endpoint,
                    timeout_ms: spec.timeout_ms,
                },
                None => AgentKind::Unconfigured {
                    reason: "http agent has no endpoint".to_string(),
                },
            },
            "cli" => AgentKind::Cli,
            other => AgentKind::Unconfigured {
                reason: format!("unsupported agent type '{other}'"),
            },
        };

        if let AgentKind::Unconfigured { reason } = &kind {
            tracing::warn!(agent = %spec.name, %reason, "Agent loaded without a usable transport");
        }

        Ok(Self {
            name: spec.name,
            kind,
            description: spec.description,
        })
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("agent name must not be empty")]
    EmptyName,

    #[error("agent '{0}' is declared more than once")]
    DuplicateAgent(String),

    #[error("agent '{agent}' must have a positive timeout_ms")]
    InvalidTimeout { agent: String },

    #[error("invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read registry file: {0}")]
    Io(#[from] std::io::Error),
}

/// Name-keyed lookup of every agent known to the supervisor.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<String, AgentMetadata>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate every declaration; the first invalid one aborts the load.
    pub fn from_specs<I>(specs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = AgentSpec>,
    {
        let mut registry = Self::new();
        for spec in specs {
            registry.insert(AgentMetadata::from_spec(spec)?)?;
        }
        tracing::debug!(agents = registry.len(), "Loaded agent registry");
        Ok(registry)
    }

    /// Parse a JSON array of agent declarations.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let specs: Vec<AgentSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Add an already validated agent.
    pub fn insert(&mut self, agent: AgentMetadata) -> Result<(), RegistryError> {
        if self.agents.contains_key(&agent.name) {
            return Err(RegistryError::DuplicateAgent(agent.name));
        }
        self.agents.insert(agent.name.clone(), agent);
        Ok(())
    }

    pub fn with_agent(mut self, agent: AgentMetadata) -> Result<Self, RegistryError> {
        self.insert(agent)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&AgentMetadata> {
        self.agents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    /// Agent names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
