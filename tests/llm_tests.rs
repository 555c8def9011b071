//! OpenAI-compatible client tests against a mocked chat completions API.

use sensei::llm::coordinator::ConversationMessage;
use sensei::llm::{LLMClient, OpenAIClient};
use sensei::types::{AppError, ToolDefinition};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

fn client_for(server: &MockServer) -> OpenAIClient {
    OpenAIClient::new(
        reqwest::Client::new(),
        "sk-test".to_string(),
        format!("{}/v1", server.uri()),
        "gpt-3.5-turbo".to_string(),
        0.0,
    )
}

fn completion(content: Value, tool_calls: Option<Value>, finish_reason: &str) -> Value {
    let mut message = json!({ "role": "assistant", "content": content });
    if let Some(calls) = tool_calls {
        message["tool_calls"] = calls;
    }
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{ "index": 0, "message": message, "finish_reason": finish_reason }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
}

fn wolfram_definition() -> ToolDefinition {
    ToolDefinition {
        name: "wolfram_alpha".to_string(),
        description: "Ask Wolfram Alpha".to_string(),
        parameters: json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        }),
    }
}

// ============= Request Shape =============

#[tokio::test]
async fn test_request_carries_auth_model_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "temperature": 0.0,
            "messages": [
                { "role": "system", "content": "be helpful" },
                { "role": "user", "content": "2+2?" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!("4"), None, "stop")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_with_tools_and_history(
            &[
                ConversationMessage::system("be helpful"),
                ConversationMessage::user("2+2?"),
            ],
            &[],
        )
        .await
        .unwrap();

    assert_eq!(response.content, "4");
    assert_eq!(response.finish_reason, "stop");
    assert!(response.tool_calls.is_empty());
    assert_eq!(response.usage.unwrap().total_tokens, 17);

    // No tools means neither `tools` nor `tool_choice` is sent
    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("tool_choice").is_none());
}

#[tokio::test]
async fn test_tools_are_advertised_and_calls_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "tool_choice": "auto",
            "tools": [{
                "type": "function",
                "function": { "name": "wolfram_alpha" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            Value::Null,
            Some(json!([{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "wolfram_alpha",
                    "arguments": "{\"query\": \"integrate x^2\"}"
                }
            }])),
            "tool_calls",
        )))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_with_tools_and_history(
            &[ConversationMessage::user("integrate x^2")],
            &[wolfram_definition()],
        )
        .await
        .unwrap();

    assert_eq!(response.content, "");
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_1");
    assert_eq!(response.tool_calls[0].name, "wolfram_alpha");
    assert_eq!(
        response.tool_calls[0].arguments,
        json!({ "query": "integrate x^2" })
    );
}

// ============= Error Mapping =============

#[tokio::test]
async fn test_unauthorized_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_with_tools_and_history(&[ConversationMessage::user("hi")], &[])
        .await
        .unwrap_err();

    match err {
        AppError::LLM(msg) => {
            assert!(msg.contains("authentication failed"));
            assert!(msg.contains("Incorrect API key provided"));
        }
        other => panic!("expected LLM error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_with_tools_and_history(&[ConversationMessage::user("hi")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(msg) if msg.contains("rate limit")));
}

#[tokio::test]
async fn test_server_error_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_with_tools_and_history(&[ConversationMessage::user("hi")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(msg) if msg.contains("500") && msg.contains("boom")));
}

#[tokio::test]
async fn test_empty_choices_is_llm_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_with_tools_and_history(&[ConversationMessage::user("hi")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_llm_error() {
    let client = OpenAIClient::new(
        reqwest::Client::new(),
        "sk-test".to_string(),
        "http://127.0.0.1:1/v1".to_string(),
        "gpt-3.5-turbo".to_string(),
        0.0,
    );

    let err = client
        .generate_with_tools_and_history(&[ConversationMessage::user("hi")], &[])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::LLM(msg) if msg.contains("request failed")));
}
