//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::pagination::PageSource;
use crate::types::FilterSpec;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH: &str = "/api/v2/logs/events/search";

fn credentials() -> Credentials {
    Credentials::new("datadoghq.eu", "api-key", "app-key")
}

async fn client_for(server: &MockServer) -> LogsClient {
    LogsClient::with_config(
        credentials(),
        LogsClientConfig::default().with_base_url(server.uri()),
    )
    .unwrap()
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_logs_client_config_default() {
    let config = LogsClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert!(config.base_url.is_none());
    assert!(config.user_agent.starts_with("dd-export/"));
}

#[test]
fn test_endpoint_from_site() {
    let client = LogsClient::new(credentials()).unwrap();
    assert_eq!(
        client.endpoint().as_str(),
        "https://api.datadoghq.eu/api/v2/logs/events/search"
    );
}

#[test]
fn test_endpoint_default_site() {
    let client = LogsClient::new(Credentials::new("", "a", "b")).unwrap();
    assert_eq!(
        client.endpoint().as_str(),
        "https://api.datadoghq.com/api/v2/logs/events/search"
    );
}

#[test]
fn test_endpoint_base_url_override() {
    let client = LogsClient::with_config(
        credentials(),
        LogsClientConfig::default()
            .with_base_url("http://localhost:9000/")
            .with_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    assert_eq!(
        client.endpoint().as_str(),
        "http://localhost:9000/api/v2/logs/events/search"
    );
}

#[test]
fn test_credentials_debug_redacts_keys() {
    let rendered = format!("{:?}", credentials());
    assert!(rendered.contains("datadoghq.eu"));
    assert!(!rendered.contains("api-key"));
    assert!(!rendered.contains("app-key"));
}

// ============================================================================
// Fetch Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(header("DD-API-KEY", "api-key"))
        .and(header("DD-APPLICATION-KEY", "app-key"))
        .and(body_partial_json(json!({
            "filter": {"query": "service:web", "from": "1000", "to": "2000"},
            "page": {"limit": 10}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "AQAAAY",
                "type": "log",
                "attributes": {
                    "timestamp": "2023-11-14T22:13:20.123Z",
                    "service": "web",
                    "status": "info",
                    "message": "hello",
                    "attributes": {"http": {"status_code": 200}}
                }
            }],
            "meta": {"page": {"after": "cursor-2"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .fetch(&FilterSpec::new("service:web", 1000, 2000), None, 10)
        .await
        .unwrap();

    assert_eq!(page.next_cursor.as_deref(), Some("cursor-2"));
    assert_eq!(page.records.len(), 1);
    let record = &page.records[0];
    assert_eq!(record.id.as_deref(), Some("AQAAAY"));
    assert_eq!(record.service.as_deref(), Some("web"));
    assert_eq!(record.message.as_deref(), Some("hello"));
    assert_eq!(record.timestamp.timestamp_millis(), 1_700_000_000_123);
    assert_eq!(record.attributes["http"]["status_code"], json!(200));
}

#[tokio::test]
async fn test_fetch_sends_cursor_and_detects_last_page() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .and(body_partial_json(json!({"page": {"cursor": "cursor-2"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "meta": {"page": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .fetch(&FilterSpec::new("*", 0, 1), Some("cursor-2"), 5000)
        .await
        .unwrap();

    assert!(page.records.is_empty());
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_fetch_missing_optional_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"attributes": {"timestamp": "2024-01-01T00:00:00Z"}}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let page = client
        .fetch(&FilterSpec::new("*", 0, 1), None, 10)
        .await
        .unwrap();

    let record = &page.records[0];
    assert!(record.service.is_none());
    assert!(record.message.is_none());
    assert!(record.attributes.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_fetch_auth_failure_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch(&FilterSpec::new("*", 0, 1), None, 10)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "Forbidden");
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_rate_limited_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch(&FilterSpec::new("*", 0, 1), None, 10)
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .fetch(&FilterSpec::new("*", 0, 1), None, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
