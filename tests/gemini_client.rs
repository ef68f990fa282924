//! GeminiClient request shape and failure classification, exercised against
//! a mock HTTP server.

use sahayak::{recommended_model, ChatError, GeminiClient, LanguageModel, ModelConfig, ModelErrorKind};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> GeminiClient {
    let cfg = ModelConfig {
        api_key: Some("test-key".into()),
        model: "gemini-pro".into(),
        endpoint: Some(server.uri()),
        request_timeout_secs: 5,
    };
    GeminiClient::from_config(&cfg).unwrap()
}

fn kind_of(err: ChatError) -> ModelErrorKind {
    match err {
        ChatError::Model { kind, .. } => kind,
        other => panic!("expected a model error, got: {other}"),
    }
}

#[tokio::test]
async fn sends_the_prompt_and_returns_the_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "sys\n\nHuman: hi\nAssistant:"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let reply = client.complete("sys\n\nHuman: hi\nAssistant:").await.unwrap();
    assert_eq!(reply, "Hello!");
}

#[tokio::test]
async fn invalid_credential_classifies_as_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("hi").await.unwrap_err();
    assert_eq!(kind_of(err), ModelErrorKind::Auth);
}

#[tokio::test]
async fn http_429_classifies_as_quota() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("hi").await.unwrap_err();
    assert_eq!(kind_of(err), ModelErrorKind::Quota);
}

#[tokio::test]
async fn unknown_model_classifies_as_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "models/gemini-nope is not found for API version v1beta", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("hi").await.unwrap_err();
    assert_eq!(kind_of(err), ModelErrorKind::ModelUnavailable);
}

#[tokio::test]
async fn empty_candidates_are_an_error_not_an_empty_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = test_client(&server).complete("hi").await.unwrap_err();
    assert_eq!(kind_of(err), ModelErrorKind::Unknown);
}

#[tokio::test]
async fn lists_models_and_recommends_a_preferred_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "models/gemini-pro"},
                {"name": "models/gemini-2.0-flash"},
                {"name": "models/embedding-001"}
            ]
        })))
        .mount(&server)
        .await;

    let available = test_client(&server).list_models().await.unwrap();
    assert_eq!(
        available,
        vec!["gemini-pro", "gemini-2.0-flash", "embedding-001"]
    );
    assert_eq!(recommended_model(&available), Some("gemini-2.0-flash"));
}
