//! Request/response schema exchanged with remote agents.
//!
//! Every agent call produces an [`AgentResponse`], including calls that never
//! left the process. Failures are carried as [`ErrorModel`] data rather than
//! surfacing as Rust errors, so the executor and synthesizer see one uniform
//! shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Handshake body POSTed to an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentRequest {
    pub request_id: String,
    pub agent_name: String,
    pub intent: String,
    pub input: Value,
    pub context: Value,
}

impl AgentRequest {
    /// Build a request with a fresh correlation id.
    pub fn new(
        agent_name: impl Into<String>,
        intent: impl Into<String>,
        input: Value,
        context: Value,
    ) -> Self {
        Self {
            request_id: new_request_id(),
            agent_name: agent_name.into(),
            intent: intent.into(),
            input,
            context,
        }
    }

    /// Input payload used when the caller supplies no custom input.
    pub fn default_input(text: &str) -> Value {
        json!({
            "text": text,
            "metadata": { "language": "en", "extra": {} }
        })
    }

    /// `custom_input` replaces the default payload wholesale; nothing is merged.
    pub fn resolve_input(text: &str, custom_input: Option<Value>) -> Value {
        custom_input.unwrap_or_else(|| Self::default_input(text))
    }
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputModel {
    pub result: Value,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl OutputModel {
    pub fn new(result: impl Into<Value>, confidence: f64) -> Self {
        Self {
            result: result.into(),
            confidence: confidence.clamp(0.0, 1.0),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Text form of `result`: strings verbatim, anything else as compact JSON.
    pub fn result_text(&self) -> String {
        match &self.result {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Normalized failure taxonomy for agent calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Agent missing, unconfigured, or a required capability is absent.
    ConfigError,
    /// Transport recognized but stubbed (currently `cli`).
    NotImplemented,
    /// Agent reachable but answered with a non-200 status.
    HttpError,
    /// Transport-level failure: refused, DNS, TLS, timeout, unreadable body.
    NetworkError,
}

impl ErrorKind {
    /// Wire name to kind; `None` for names outside the taxonomy.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "config_error" => Some(ErrorKind::ConfigError),
            "not_implemented" => Some(ErrorKind::NotImplemented),
            "http_error" => Some(ErrorKind::HttpError),
            "network_error" => Some(ErrorKind::NetworkError),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigError => "config_error",
            ErrorKind::NotImplemented => "not_implemented",
            ErrorKind::HttpError => "http_error",
            ErrorKind::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorModel {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorModel {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Error,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Success => "success",
            AgentStatus::Error => "error",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome {
    Success(OutputModel),
    Error(ErrorModel),
}

/// Agent reply. Exactly one of output/error exists, enforced by [`AgentOutcome`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "WireResponse", into = "WireResponse")]
pub struct AgentResponse {
    pub request_id: String,
    pub agent_name: String,
    pub outcome: AgentOutcome,
}

impl AgentResponse {
    pub fn success(
        request_id: impl Into<String>,
        agent_name: impl Into<String>,
        output: OutputModel,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            agent_name: agent_name.into(),
            outcome: AgentOutcome::Success(output),
        }
    }

    pub fn error(
        request_id: impl Into<String>,
        agent_name: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            agent_name: agent_name.into(),
            outcome: AgentOutcome::Error(ErrorModel::new(kind, message)),
        }
    }

    pub fn status(&self) -> AgentStatus {
        match self.outcome {
            AgentOutcome::Success(_) => AgentStatus::Success,
            AgentOutcome::Error(_) => AgentStatus::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AgentOutcome::Success(_))
    }

    pub fn output(&self) -> Option<&OutputModel> {
        match &self.outcome {
            AgentOutcome::Success(output) => Some(output),
            AgentOutcome::Error(_) => None,
        }
    }

    pub fn error_model(&self) -> Option<&ErrorModel> {
        match &self.outcome {
            AgentOutcome::Error(error) => Some(error),
            AgentOutcome::Success(_) => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_model().map(|e| e.kind)
    }
}

/// Response body that does not match the handshake schema.
#[derive(Debug, Error, PartialEq)]
pub enum ResponseShapeError {
    #[error("status 'success' requires an output and no error")]
    SuccessShape,

    #[error("status 'error' requires an error and no output")]
    ErrorShape,

    #[error("confidence {0} is outside 0.0..=1.0")]
    ConfidenceRange(f64),
}

#[derive(Serialize, Deserialize)]
struct WireResponse {
    request_id: String,
    agent_name: String,
    status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<OutputModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<WireError>,
}

/// Error body as agents send it. The type is kept as text so agent-specific
/// kinds can be folded into the taxonomy instead of failing the parse.
#[derive(Serialize, Deserialize)]
struct WireError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

impl From<WireError> for ErrorModel {
    /// Kinds outside the taxonomy become `http_error`, keeping the agent's own
    /// type name in front of its message.
    fn from(wire: WireError) -> Self {
        match ErrorKind::from_wire(&wire.kind) {
            Some(kind) => ErrorModel::new(kind, wire.message),
            None => ErrorModel::new(
                ErrorKind::HttpError,
                format!("{}: {}", wire.kind, wire.message),
            ),
        }
    }
}

impl From<ErrorModel> for WireError {
    fn from(error: ErrorModel) -> Self {
        Self {
            kind: error.kind.as_str().to_string(),
            message: error.message,
        }
    }
}

impl TryFrom<WireResponse> for AgentResponse {
    type Error = ResponseShapeError;

    fn try_from(wire: WireResponse) -> Result<Self, Self::Error> {
        let outcome = match (wire.status, wire.output, wire.error) {
            (AgentStatus::Success, Some(output), None) => {
                if !(0.0..=1.0).contains(&output.confidence) {
                    return Err(ResponseShapeError::ConfidenceRange(output.confidence));
                }
                AgentOutcome::Success(output)
            }
            (AgentStatus::Success, _, _) => return Err(ResponseShapeError::SuccessShape),
            (AgentStatus::Error, None, Some(error)) => AgentOutcome::Error(error.into()),
            (AgentStatus::Error, _, _) => return Err(ResponseShapeError::ErrorShape),
        };
        Ok(Self {
            request_id: wire.request_id,
            agent_name: wire.agent_name,
            outcome,
        })
    }
}

impl From<AgentResponse> for WireResponse {
    fn from(response: AgentResponse) -> Self {
        let status = response.status();
        let (output, error) = match response.outcome {
            AgentOutcome::Success(output) => (Some(output), None),
            AgentOutcome::Error(error) => (None, Some(error.into())),
        };
        Self {
            request_id: response.request_id,
            agent_name: response.agent_name,
            status,
            output,
            error,
        }
    }
}
