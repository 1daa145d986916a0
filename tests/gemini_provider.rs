use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use nexa::llm::{GeminiProvider, GenerateRequest, ImagePart, Provider};

fn candidates_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {"content": {"parts": [{"text": text}], "role": "model"}}
        ]
    })
}

#[tokio::test]
async fn generate_posts_to_model_endpoint_and_returns_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidates_body("Use PPC cement.")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Some("test-key")).with_base_url(server.uri());
    let request = GenerateRequest::text("Which cement?", "gemini-2.0-flash", 0.7);

    let text = provider.generate(&request).await.unwrap();
    assert_eq!(text, "Use PPC cement.");
    server.verify().await;
}

#[tokio::test]
async fn json_flows_request_json_mime_type_and_inline_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidates_body(r#"{"answer": "granite"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Some("test-key")).with_base_url(server.uri());
    let request = GenerateRequest::text("what stone is this?", "gemini-2.0-flash", 0.7)
        .expecting_json()
        .with_image(ImagePart {
            media_type: "image/jpeg".into(),
            data: "aGVsbG8=".into(),
        });

    let text = provider.generate(&request).await.unwrap();
    assert_eq!(text, r#"{"answer": "granite"}"#);

    let received: Vec<Request> = server
        .received_requests()
        .await
        .expect("mock server should record received requests");
    assert_eq!(received.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(
        body["generation_config"]["response_mime_type"],
        "application/json"
    );
    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
}

#[tokio::test]
async fn upstream_error_is_surfaced_without_the_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string("API key not valid: test-key. Please pass a valid API key."),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Some("test-key")).with_base_url(server.uri());
    let request = GenerateRequest::text("hi", "gemini-2.0-flash", 0.7);

    let err = provider.generate(&request).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(!message.contains("test-key"));
}

#[tokio::test]
async fn empty_candidates_are_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(Some("test-key")).with_base_url(server.uri());
    let request = GenerateRequest::text("hi", "gemini-2.0-flash", 0.7);

    let err = provider.generate(&request).await.unwrap_err();
    assert!(err.to_string().contains("No response from Gemini"));
}
