//! Integration tests for the Gemini provider and the model gateway
//!
//! Runs the real HTTP client against a wiremock server standing in for the
//! `generateContent` endpoint.

use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use vibebot_engine::config::GeminiConfig;
use vibebot_engine::llm::{GeminiProvider, LLMError, ModelGateway};
use vibebot_engine::secrets::SecretString;

const MODEL: &str = "gemini-2.5-flash";
const ENDPOINT: &str = "/models/gemini-2.5-flash:generateContent";

fn gateway_for(server: &MockServer, key: &str) -> ModelGateway {
    let config = GeminiConfig {
        base_url: server.uri(),
        model: MODEL.to_string(),
        timeout_secs: 5,
    };
    let provider = GeminiProvider::new(config, SecretString::new(key)).unwrap();
    ModelGateway::new(Arc::new(provider))
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_single_turn_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Translate this"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Hello "}, {"text": "there"}]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    let text = gateway.single_turn("Translate this", None).await.unwrap();

    assert_eq!(text, "Hello there");
}

#[tokio::test]
async fn test_single_turn_sends_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "Be chill"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    let text = gateway.single_turn("hi", Some("Be chill")).await.unwrap();

    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_plain_call_has_no_tools() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("NO")))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    gateway.single_turn("needs web?", None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body.get("tools").is_none());
    assert!(body.get("systemInstruction").is_none());
}

#[tokio::test]
async fn test_search_turn_returns_sources() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({"tools": [{"google_search": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "India won by 5 wickets."}]},
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://example.com/a", "title": "Scorecard"}},
                        {"retrievedContext": {"uri": "gs://bucket/doc"}},
                        {"web": {"uri": "", "title": "Broken"}},
                        {"web": {"uri": "https://example.com/b"}}
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    let result = gateway.search_turn("who won the match").await.unwrap();

    assert_eq!(result.text, "India won by 5 wickets.");
    assert_eq!(result.sources.len(), 2);
    assert_eq!(result.sources[0].uri, "https://example.com/a");
    assert_eq!(result.sources[0].title, "Scorecard");
    assert_eq!(result.sources[1].uri, "https://example.com/b");
    assert_eq!(result.sources[1].title, "https://example.com/b");
}

#[tokio::test]
async fn test_search_turn_without_metadata_has_no_sources() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Sunny")))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    let result = gateway.search_turn("weather").await.unwrap();

    assert_eq!(result.text, "Sunny");
    assert!(result.sources.is_empty());
}

#[tokio::test]
async fn test_status_codes_are_classified() {
    let cases = [
        (400u16, "bad"),
        (401, "auth"),
        (403, "auth"),
        (404, "bad"),
        (429, "rate"),
        (500, "down"),
        (503, "down"),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server, "test-key");
        let err = gateway.single_turn("hi", None).await.unwrap_err();

        let matched = match expected {
            "bad" => matches!(err, LLMError::InvalidRequest(_)),
            "auth" => matches!(err, LLMError::AuthenticationFailed(_)),
            "rate" => matches!(err, LLMError::RateLimitExceeded),
            _ => matches!(err, LLMError::ProviderUnavailable(_)),
        };
        assert!(matched, "status {} gave {:?}", status, err);
        assert!(err.stage_text().starts_with("Error: "));
    }
}

#[tokio::test]
async fn test_empty_candidates_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, "test-key");
    let err = gateway.search_turn("anything").await.unwrap_err();

    assert!(matches!(err, LLMError::ParseError(_)));
}

#[tokio::test]
async fn test_api_key_is_scrubbed_from_errors() {
    let server = MockServer::start().await;
    let key = format!("AIza{}", "k".repeat(35));

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", key.as_str()))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(format!("API key {} is invalid", key)),
        )
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, &key);
    let err = gateway.single_turn("hi", None).await.unwrap_err();

    assert!(matches!(err, LLMError::InvalidRequest(_)));
    assert!(!err.to_string().contains(&key));
    assert!(err.to_string().contains("[REDACTED]"));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server, "test-key");
    drop(server);

    let err = gateway.single_turn("hi", None).await.unwrap_err();

    assert!(matches!(
        err,
        LLMError::NetworkError(_) | LLMError::Timeout
    ));
}
