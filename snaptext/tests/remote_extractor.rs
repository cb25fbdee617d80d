use image::DynamicImage;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snaptext::config::GeminiConfig;
use snaptext::error::ExtractionError;
use snaptext::extract::remote::GeminiExtractor;
use snaptext::extract::{TextExtractor, REMOTE_NO_TEXT_SENTINEL};

const MODEL_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn test_key() -> String {
    format!("AIza{}", "x".repeat(35))
}

fn make_extractor(base_url: &str) -> GeminiExtractor {
    let config = GeminiConfig {
        api_key: test_key(),
        model: "gemini-2.5-flash".to_string(),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        max_image_dimension: 4096,
    };
    GeminiExtractor::new(&config).expect("create extractor")
}

fn test_image() -> DynamicImage {
    DynamicImage::new_rgb8(64, 64)
}

#[tokio::test]
async fn successful_extraction_returns_joined_candidate_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", test_key().as_str()))
        .and(body_string_contains("inline_data"))
        .and(body_string_contains("image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "HELLO " }, { "text": "WORLD" } ] } }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let text = extractor.extract(&test_image()).await.expect("extract");
    assert_eq!(text, "HELLO WORLD");
}

#[tokio::test]
async fn empty_candidates_yield_no_text_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let text = extractor.extract(&test_image()).await.expect("extract");
    assert_eq!(text, REMOTE_NO_TEXT_SENTINEL);
}

#[tokio::test]
async fn whitespace_only_text_yields_no_text_sentinel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "  \n  " } ] } }
            ]
        })))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let text = extractor.extract(&test_image()).await.expect("extract");
    assert_eq!(text, REMOTE_NO_TEXT_SENTINEL);
}

#[tokio::test]
async fn block_reason_becomes_blocked_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let err = extractor.extract(&test_image()).await.unwrap_err();
    assert_eq!(err, ExtractionError::Blocked("SAFETY".to_string()));
}

#[tokio::test]
async fn status_429_becomes_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let err = extractor.extract(&test_image()).await.unwrap_err();
    assert_eq!(err, ExtractionError::RateLimited);
}

#[tokio::test]
async fn status_403_becomes_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let err = extractor.extract(&test_image()).await.unwrap_err();
    assert_eq!(err, ExtractionError::Forbidden);
}

#[tokio::test]
async fn status_400_becomes_invalid_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let err = extractor.extract(&test_image()).await.unwrap_err();
    assert_eq!(err, ExtractionError::InvalidCredentials);
}

#[tokio::test]
async fn status_500_becomes_backend_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&mock_server)
        .await;

    let extractor = make_extractor(&mock_server.uri());
    let err = extractor.extract(&test_image()).await.unwrap_err();
    assert!(matches!(err, ExtractionError::Backend(_)));
}
