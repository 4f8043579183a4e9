//! Mock API tests for the Anthropic backend.
//!
//! Responses follow the Messages API wire format.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::sync::Arc;

use one::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
struct Person {
    name: String,
    age: u32,
}

/// A city with an optional nickname.
#[derive(Debug, Deserialize, JsonSchema)]
struct City {
    name: String,
    country: String,
    nickname: Option<String>,
}

fn message_response(text: &str) -> Value {
    json!({
        "id": "msg_013Zva2CMHLNnXjNJJKqJ2EF",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "stop_sequence": null,
        "usage": { "input_tokens": 25, "output_tokens": 12 }
    })
}

fn error_response(error_type: &str, message: &str) -> Value {
    json!({ "type": "error", "error": { "type": error_type, "message": message } })
}

fn model_for(server: &MockServer) -> Model {
    let config = AnthropicConfig::new("test-api-key").with_base_url(server.uri());
    let provider = Arc::new(Anthropic::new(config).unwrap());
    Model::from_provider(provider, "claude-3-5-sonnet-20241022")
}

async fn last_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    requests.last().unwrap().body_json().unwrap()
}

#[tokio::test]
async fn test_generate_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-api-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response("Paris")))
        .expect(1)
        .mount(&server)
        .await;

    let text = model_for(&server)
        .generate("What is the capital of France?")
        .await
        .unwrap();
    assert_eq!(text, "Paris");

    let body = last_body(&server).await;
    assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["temperature"], json!(0.7_f32));
    assert_eq!(
        body["messages"],
        json!([{ "role": "user", "content": "What is the capital of France?" }])
    );
    assert!(body.get("system").is_none());
}

#[tokio::test]
async fn test_generate_with_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_partial_json(json!({
            "model": "claude-3-opus-20240229",
            "max_tokens": 200,
            "system": "You are terse.",
            "top_k": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("Test prompt")
        .model("claude-3-opus-20240229")
        .max_tokens(200)
        .system("You are terse.")
        .param("top_k", 5);
    let text = model_for(&server).generate_with(request).await.unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_empty_content_is_empty_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [],
            "stop_reason": "end_turn"
        })))
        .mount(&server)
        .await;

    let text = model_for(&server).generate("hi").await.unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_generate_structured_uses_system_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(message_response(r#"{"name": "John", "age": 30}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let person: Person = model_for(&server)
        .generate_structured("Generate a person")
        .await
        .unwrap();
    assert_eq!(
        person,
        Person {
            name: "John".to_owned(),
            age: 30
        }
    );

    let body = last_body(&server).await;
    let system = body["system"].as_str().unwrap();
    assert!(system.contains("JSON"));
    assert!(system.contains("\"age\""));
    assert!(system.ends_with("Only return the JSON object, no other text."));
    assert!(body.get("response_format").is_none());
}

#[tokio::test]
async fn test_structured_keeps_caller_system_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_response(
            r#"{"name": "Paris", "country": "France", "nickname": "City of Light"}"#,
        )))
        .mount(&server)
        .await;

    let request =
        GenerateRequest::new("Describe the capital of France").system("You are a geographer.");
    let city: City = model_for(&server)
        .generate_structured_with(request)
        .await
        .unwrap();
    assert_eq!(city.name, "Paris");
    assert_eq!(city.country, "France");
    assert_eq!(city.nickname.as_deref(), Some("City of Light"));

    let body = last_body(&server).await;
    let system = body["system"].as_str().unwrap();
    assert!(system.starts_with("You are a geographer.\n\nYou must respond with valid JSON"));
}

#[tokio::test]
async fn test_structured_schema_violation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(message_response(r#"{"name": "John"}"#)),
        )
        .mount(&server)
        .await;

    let err = model_for(&server)
        .generate_structured::<Person>("Generate a person")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Validation { ref schema, .. } if schema == "Person"),
        "{err}"
    );
}

#[tokio::test]
async fn test_structured_prose_is_validation_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(message_response("Here is a person: John, 30")),
        )
        .mount(&server)
        .await;

    let err = model_for(&server)
        .generate_structured::<Person>("Generate a person")
        .await
        .unwrap_err();
    assert!(err.is_validation(), "{err}");
}

#[tokio::test]
async fn test_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(error_response("authentication_error", "invalid x-api-key")),
        )
        .mount(&server)
        .await;

    let err = model_for(&server).generate("hi").await.unwrap_err();
    let llm = err.as_llm().unwrap();
    assert_eq!(llm.kind, LlmErrorKind::Auth);
    assert_eq!(llm.provider.as_deref(), Some("anthropic"));
}

#[tokio::test]
async fn test_overloaded_error_keeps_type() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(529)
                .set_body_json(error_response("overloaded_error", "Overloaded")),
        )
        .mount(&server)
        .await;

    let err = model_for(&server).generate("hi").await.unwrap_err();
    let llm = err.as_llm().unwrap();
    assert_eq!(llm.kind, LlmErrorKind::Provider);
    assert_eq!(llm.code.as_deref(), Some("overloaded_error"));
    assert_eq!(llm.message, "Overloaded");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let config = AnthropicConfig::new("test-api-key").with_base_url("http://127.0.0.1:1");
    let model = Model::from_provider(
        Arc::new(Anthropic::new(config).unwrap()),
        "claude-3-5-sonnet-20241022",
    );

    let err = model.generate("hi").await.unwrap_err();
    let llm = err.as_llm().unwrap();
    assert_eq!(llm.kind, LlmErrorKind::Network);
    assert_eq!(llm.provider.as_deref(), Some("anthropic"));
    assert!(llm.is_retryable());
}
