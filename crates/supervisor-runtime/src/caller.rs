//! Single handshake against a single agent.
//!
//! [`AgentCaller::call`] never fails in the Rust sense: transport problems,
//! missing configuration and stubbed transports all come back as an
//! [`AgentResponse`] whose outcome is an [`ErrorModel`](supervisor_core::ErrorModel).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use supervisor_core::handshake::{AgentRequest, AgentResponse, ErrorKind};
use supervisor_core::registry::{AgentKind, AgentMetadata};

use crate::config::AgentCallerConfig;

/// Seam between the executor and whatever actually reaches an agent.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(
        &self,
        agent: &AgentMetadata,
        intent: &str,
        text: &str,
        context: &Value,
        custom_input: Option<Value>,
    ) -> AgentResponse;
}

/// Calls agents over their configured transport.
#[derive(Debug, Clone)]
pub struct AgentCaller {
    client: Option<Client>,
}

impl Default for AgentCaller {
    fn default() -> Self {
        Self::from_config(AgentCallerConfig::default())
    }
}

impl AgentCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the shared HTTP client. A client that fails to build leaves the
    /// caller without HTTP capability instead of failing construction.
    pub fn from_config(config: AgentCallerConfig) -> Self {
        if !config.http_enabled {
            return Self::without_http();
        }
        match Client::builder().user_agent(config.user_agent).build() {
            Ok(client) => Self {
                client: Some(client),
            },
            Err(err) => {
                tracing::warn!(error = %err, "HTTP client unavailable, http agents will report config_error");
                Self::without_http()
            }
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn without_http() -> Self {
        Self { client: None }
    }

    pub fn has_http(&self) -> bool {
        self.client.is_some()
    }

    /// Run one handshake. `custom_input` replaces the default input payload.
    pub async fn call(
        &self,
        agent: &AgentMetadata,
        intent: &str,
        text: &str,
        context: &Value,
        custom_input: Option<Value>,
    ) -> AgentResponse {
        let request = AgentRequest::new(
            agent.name.clone(),
            intent,
            AgentRequest::resolve_input(text, custom_input),
            context.clone(),
        );

        tracing::debug!(
            agent = %agent.name,
            transport = agent.kind.type_name(),
            request_id = %request.request_id,
            intent = %intent,
            "Dispatching agent call"
        );

        match &agent.kind {
            AgentKind::Http {
                endpoint,
                timeout_ms,
            } => match &self.client {
                Some(client) => post_handshake(client, &request, endpoint, *timeout_ms).await,
                None => failure(
                    &request,
                    ErrorKind::ConfigError,
                    "no HTTP capability for agent calls",
                ),
            },
            AgentKind::Cli => failure(
                &request,
                ErrorKind::NotImplemented,
                "CLI agent execution is not implemented",
            ),
            AgentKind::Unconfigured { reason } => failure(
                &request,
                ErrorKind::ConfigError,
                format!("agent endpoint/command not configured ({reason})"),
            ),
        }
    }
}

#[async_trait]
impl AgentInvoker for AgentCaller {
    async fn invoke(
        &self,
        agent: &AgentMetadata,
        intent: &str,
        text: &str,
        context: &Value,
        custom_input: Option<Value>,
    ) -> AgentResponse {
        self.call(agent, intent, text, context, custom_input).await
    }
}

async fn post_handshake(
    client: &Client,
    request: &AgentRequest,
    endpoint: &str,
    timeout_ms: u64,
) -> AgentResponse {
    let sent = client
        .post(endpoint)
        .timeout(Duration::from_millis(timeout_ms))
        .json(request)
        .send()
        .await;

    let response = match sent {
        Ok(response) => response,
        Err(err) => return failure(request, ErrorKind::NetworkError, err.to_string()),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return failure(
            request,
            ErrorKind::HttpError,
            format!("HTTP {} calling {}", status.as_u16(), endpoint),
        );
    }

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => return failure(request, ErrorKind::NetworkError, err.to_string()),
    };

    // A 200 whose body is not a valid handshake response is reported as a
    // transport failure.
    match serde_json::from_slice::<AgentResponse>(&body) {
        Ok(parsed) => {
            if parsed.request_id != request.request_id {
                tracing::debug!(
                    agent = %request.agent_name,
                    expected = %request.request_id,
                    received = %parsed.request_id,
                    "Agent did not echo the request id"
                );
            }
            parsed
        }
        Err(err) => failure(
            request,
            ErrorKind::NetworkError,
            format!("invalid response from {endpoint}: {err}"),
        ),
    }
}

fn failure(request: &AgentRequest, kind: ErrorKind, message: impl Into<String>) -> AgentResponse {
    let message = message.into();
    tracing::warn!(
        agent = %request.agent_name,
        request_id = %request.request_id,
        error_type = %kind,
        %message,
        "Agent call failed"
    );
    AgentResponse::error(
        request.request_id.clone(),
        request.agent_name.clone(),
        kind,
        message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use supervisor_core::handshake::AgentStatus;

    #[tokio::test]
    async fn cli_agents_are_not_implemented() {
        let caller = AgentCaller::new();
        let response = caller
            .call(&AgentMetadata::cli("Shell"), "run", "ls", &json!({}), None)
            .await;

        assert_eq!(response.status(), AgentStatus::Error);
        assert_eq!(response.error_kind(), Some(ErrorKind::NotImplemented));
        assert_eq!(response.agent_name, "Shell");
    }

    #[tokio::test]
    async fn cli_agents_ignore_custom_input() {
        let response = AgentCaller::without_http()
            .call(
                &AgentMetadata::cli("Shell"),
                "run",
                "",
                &Value::Null,
                Some(json!({"cmd": "echo"})),
            )
            .await;
        assert_eq!(response.error_kind(), Some(ErrorKind::NotImplemented));
    }

    #[tokio::test]
    async fn unconfigured_agents_are_config_errors() {
        let agent = AgentMetadata::unconfigured("Ghost", "http agent has no endpoint");
        let response = AgentCaller::new()
            .call(&agent, "x", "y", &json!({}), None)
            .await;

        assert_eq!(response.error_kind(), Some(ErrorKind::ConfigError));
        assert!(response
            .error_model()
            .unwrap()
            .message
            .contains("not configured"));
    }

    #[tokio::test]
    async fn http_without_client_skips_network() {
        // Port 9 on an unroutable address would hang or refuse if it were dialed.
        let agent = AgentMetadata::http("KBAgent", "http://10.255.255.1:9/run", 100);
        let response = AgentCaller::without_http()
            .call(&agent, "update_wiki", "notes", &json!({}), None)
            .await;

        assert_eq!(response.error_kind(), Some(ErrorKind::ConfigError));
        assert!(response
            .error_model()
            .unwrap()
            .message
            .contains("no HTTP capability"));
    }

    #[tokio::test]
    async fn disabled_http_config_drops_client() {
        let caller = AgentCaller::from_config(AgentCallerConfig::default().with_http_enabled(false));
        assert!(!caller.has_http());
        assert!(AgentCaller::new().has_http());
    }

    #[tokio::test]
    async fn error_responses_get_fresh_request_ids() {
        let caller = AgentCaller::new();
        let agent = AgentMetadata::cli("Shell");
        let a = caller.call(&agent, "x", "", &Value::Null, None).await;
        let b = caller.call(&agent, "x", "", &Value::Null, None).await;
        assert_ne!(a.request_id, b.request_id);
    }
}
