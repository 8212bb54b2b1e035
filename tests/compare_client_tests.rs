//! Mock HTTP tests for CompareClient.
//!
//! These tests cover:
//! - Multipart request formatting
//! - Success response parsing
//! - Error body handling and the generic fallback
//! - Rendering of the parsed results

use card_scanner::compare::{
    CaptureRequest, CompareClient, CompareError, HashType, ImagePayload, GENERIC_SERVER_ERROR,
};
use card_scanner::render::{render_error, render_result, RenderOptions, EXACT_MATCH_BANNER};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn jpeg_payload() -> ImagePayload {
    ImagePayload {
        // ASCII body keeps the multipart payload matchable as text
        bytes: b"fake-jpeg-bytes".to_vec(),
        file_name: "capture.jpg".to_string(),
        mime: "image/jpeg".to_string(),
    }
}

fn request() -> CaptureRequest {
    CaptureRequest::new(jpeg_payload(), HashType::Phash, 16)
}

fn no_match_body() -> serde_json::Value {
    serde_json::json!({
        "exact_match": false,
        "hash": "ffe0c0",
        "hash_type": "phash",
        "hash_size": 16,
        "closest_matches": [],
        "total_matches": 0
    })
}

// === Request Format ===

#[tokio::test]
async fn test_compare_posts_multipart_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .and(body_string_contains("name=\"image\"; filename=\"capture.jpg\""))
        .and(body_string_contains("fake-jpeg-bytes"))
        .and(body_string_contains("name=\"hash_type\""))
        .and(body_string_contains("\r\n\r\nphash\r\n"))
        .and(body_string_contains("name=\"hash_size\""))
        .and(body_string_contains("\r\n\r\n16\r\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let result = client.compare(&request()).await.unwrap();

    assert!(!result.exact_match);
    assert_eq!(result.hash, "ffe0c0");
}

#[tokio::test]
async fn test_compare_sends_optional_fields_when_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .and(body_string_contains("\r\n\r\ndhash\r\n"))
        .and(body_string_contains("name=\"max_distance\""))
        .and(body_string_contains("\r\n\r\n12\r\n"))
        .and(body_string_contains("name=\"limit\""))
        .and(body_string_contains("\r\n\r\n3\r\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let request = CaptureRequest::new(jpeg_payload(), HashType::Dhash, 8)
        .with_max_distance(Some(12))
        .with_limit(Some(3));

    assert!(client.compare(&request).await.is_ok());
}

#[tokio::test]
async fn test_compare_omits_optional_fields_when_unset() {
    let mock_server = MockServer::start().await;

    // Catch-all for requests that wrongly include max_distance
    Mock::given(method("POST"))
        .and(path("/compare"))
        .and(body_string_contains("max_distance"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(no_match_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    assert!(client.compare(&request()).await.is_ok());
}

// === Success Responses ===

#[tokio::test]
async fn test_exact_match_renders_exact_banner() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "exact_match": true,
            "hash": "abcd",
            "hash_type": "phash",
            "hash_size": "16",
            "closest_matches": [{"name": "Pikachu", "distance": 0}],
            "total_matches": 1
        })))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let result = client.compare(&request()).await.unwrap();
    let text = render_result(&result, &RenderOptions::default());

    assert!(text.starts_with(EXACT_MATCH_BANNER));
    assert!(text.contains("Hash: abcd"));
    assert!(text.contains("Type: phash (size: 16)"));
    assert!(text.contains("1. Pikachu (distance: 0)"));
}

#[tokio::test]
async fn test_closest_matches_keep_server_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "exact_match": false,
            "hash": "abcd",
            "hash_type": "phash",
            "hash_size": 16,
            "closest_matches": [
                {"name": "A", "distance": 2},
                {"name": "B", "distance": 5}
            ],
            "total_matches": 2
        })))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let result = client.compare(&request()).await.unwrap();
    let names: Vec<_> = result.matches().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let text = render_result(&result, &RenderOptions::default());
    let a = text.find("1. A (distance: 2)").unwrap();
    let b = text.find("2. B (distance: 5)").unwrap();
    assert!(a < b);
}

#[tokio::test]
async fn test_success_with_invalid_json_is_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let result = client.compare(&request()).await;
    assert!(matches!(result, Err(CompareError::Http(_))));
}

// === Error Responses ===

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": "bad image"})),
        )
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let err = client.compare(&request()).await.unwrap_err();

    match &err {
        CompareError::Server { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "bad image");
        }
        other => panic!("Expected Server error, got {:?}", other),
    }
    assert_eq!(render_error(&err), "❌ Erreur: bad image");
}

#[tokio::test]
async fn test_unparsable_error_body_uses_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let err = client.compare(&request()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);
    assert_eq!(render_error(&err), "❌ Erreur: Erreur serveur");
}

#[tokio::test]
async fn test_error_body_without_error_field_uses_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(serde_json::json!({"detail": "nope"})),
        )
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let err = client.compare(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);
}

#[tokio::test]
async fn test_non_string_error_is_shown_as_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": 42})))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let err = client.compare(&request()).await.unwrap_err();
    assert_eq!(render_error(&err), "❌ Erreur: 42");
}

#[tokio::test]
async fn test_empty_error_message_uses_generic_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({"error": ""})))
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    let err = client.compare(&request()).await.unwrap_err();
    assert_eq!(err.to_string(), GENERIC_SERVER_ERROR);
}

#[tokio::test]
async fn test_no_retry_on_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/compare"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CompareClient::new(&mock_server.uri()).unwrap();
    assert!(client.compare(&request()).await.is_err());
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Nothing listens on port 1
    let client = CompareClient::new("http://127.0.0.1:1").unwrap();
    let err = client.compare(&request()).await.unwrap_err();
    assert!(matches!(err, CompareError::Http(_)));
    assert!(render_error(&err).starts_with("❌ Erreur: requête échouée"));
}
