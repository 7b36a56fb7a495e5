//! HTTP handshake behaviour of the agent caller against mock agents.

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

use supervisor_core::{AgentMetadata, AgentRequest, AgentStatus, ErrorKind};
use supervisor_runtime::AgentCaller;

/// Answers like a conforming agent, echoing the request id.
struct EchoAgent;

impl Respond for EchoAgent {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let handshake: AgentRequest = request.body_json().expect("handshake body");
        ResponseTemplate::new(200).set_body_json(json!({
            "request_id": handshake.request_id,
            "agent_name": handshake.agent_name,
            "status": "success",
            "output": {
                "result": format!("handled {}", handshake.intent),
                "confidence": 0.8,
                "details": {"echo": handshake.input}
            }
        }))
    }
}

fn agent_at(server: &MockServer, timeout_ms: u64) -> AgentMetadata {
    AgentMetadata::http("KBAgent", format!("{}/run", server.uri()), timeout_ms)
}

#[tokio::test]
async fn success_response_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(EchoAgent)
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(
            &agent_at(&server, 2_000),
            "update_wiki",
            "meeting notes",
            &json!({"user_id": "tester"}),
            None,
        )
        .await;

    assert_eq!(response.status(), AgentStatus::Success);
    let output = response.output().unwrap();
    assert_eq!(output.result, json!("handled update_wiki"));
    assert_eq!(output.confidence, 0.8);
}

#[tokio::test]
async fn posts_the_handshake_with_default_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/run"))
        .respond_with(EchoAgent)
        .expect(1)
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(
            &agent_at(&server, 2_000),
            "update_wiki",
            "meeting notes",
            &json!({"user_id": "tester"}),
            None,
        )
        .await;

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["agent_name"], "KBAgent");
    assert_eq!(body["intent"], "update_wiki");
    assert_eq!(
        body["input"],
        json!({"text": "meeting notes", "metadata": {"language": "en", "extra": {}}})
    );
    assert_eq!(body["context"], json!({"user_id": "tester"}));
    assert_eq!(body["request_id"], json!(response.request_id));
}

#[tokio::test]
async fn custom_input_replaces_default_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoAgent)
        .mount(&server)
        .await;

    AgentCaller::new()
        .call(
            &agent_at(&server, 2_000),
            "update_wiki",
            "ignored text",
            &json!({}),
            Some(json!({"page": "Project X", "body": "notes"})),
        )
        .await;

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["input"], json!({"page": "Project X", "body": "notes"}));
}

#[tokio::test]
async fn server_error_becomes_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let agent = agent_at(&server, 2_000);
    let response = AgentCaller::new()
        .call(&agent, "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.status(), AgentStatus::Error);
    assert_eq!(response.error_kind(), Some(ErrorKind::HttpError));
    let message = &response.error_model().unwrap().message;
    assert!(message.contains("500"));
    assert!(message.contains(&format!("{}/run", server.uri())));
}

#[tokio::test]
async fn non_200_success_codes_are_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "request_id": "r",
            "agent_name": "KBAgent",
            "status": "success",
            "output": {"result": "created"}
        })))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::HttpError));
}

#[tokio::test]
async fn refused_connection_becomes_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let agent = AgentMetadata::http("KBAgent", format!("http://127.0.0.1:{port}/run"), 2_000);

    let response = AgentCaller::new()
        .call(&agent, "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.status(), AgentStatus::Error);
    assert_eq!(response.error_kind(), Some(ErrorKind::NetworkError));
    assert!(!response.error_model().unwrap().message.is_empty());
}

#[tokio::test]
async fn slow_agent_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 50), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn unparseable_success_body_becomes_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::NetworkError));
    assert!(response
        .error_model()
        .unwrap()
        .message
        .contains("invalid response"));
    assert_eq!(response.agent_name, "KBAgent");
}

#[tokio::test]
async fn success_without_output_becomes_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r",
            "agent_name": "KBAgent",
            "status": "success"
        })))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::NetworkError));
}

#[tokio::test]
async fn agent_reported_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r",
            "agent_name": "KBAgent",
            "status": "error",
            "error": {"type": "config_error", "message": "wiki credentials missing"}
        })))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::ConfigError));
    assert_eq!(
        response.error_model().unwrap().message,
        "wiki credentials missing"
    );
}

#[tokio::test]
async fn out_of_range_confidence_becomes_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r",
            "agent_name": "KBAgent",
            "status": "success",
            "output": {"result": "KB updated", "confidence": 7.5}
        })))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::NetworkError));
    let message = &response.error_model().unwrap().message;
    assert!(message.contains("invalid response"));
    assert!(message.contains("confidence"));
}

#[tokio::test]
async fn agent_specific_error_kinds_keep_the_agent_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "r",
            "agent_name": "KBAgent",
            "status": "error",
            "error": {"type": "validation_error", "message": "page title required"}
        })))
        .mount(&server)
        .await;

    let response = AgentCaller::new()
        .call(&agent_at(&server, 2_000), "x", "y", &json!({}), None)
        .await;

    assert_eq!(response.error_kind(), Some(ErrorKind::HttpError));
    assert_eq!(
        response.error_model().unwrap().message,
        "validation_error: page title required"
    );
}
