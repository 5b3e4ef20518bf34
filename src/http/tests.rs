//! Tests for the HTTP client module

use super::client::truncate_body;
use super::*;
use crate::error::{Error, ErrorKind};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn default_client() -> HttpClient {
    HttpClient::with_config(HttpClientConfig::default()).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(10));
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("weather-ingest/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(3))
        .header("X-Custom", "value")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("latitude", "51.5")
        .query("timezone", "auto");

    assert_eq!(config.query.get("latitude"), Some(&"51.5".to_string()));
    assert_eq!(config.query.len(), 2);
}

#[tokio::test]
async fn test_http_client_get_json_sends_header_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(header("X-Custom", "value"))
        .and(query_param("latitude", "51.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .header("X-Custom", "value")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let request = RequestConfig::new().query("latitude", "51.5");
    let body: Value = client
        .get_json_with_config(&format!("{}/v1/forecast", mock_server.uri()), request)
        .await
        .unwrap();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_http_client_status_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = default_client()
        .get_json_with_config::<Value>(&mock_server.uri(), RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "Service Unavailable");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_client_caps_large_error_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(20_000)))
        .mount(&mock_server)
        .await;

    let err = default_client()
        .get_json_with_config::<Value>(&mock_server.uri(), RequestConfig::new())
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 502);
            assert!(body.starts_with(&"x".repeat(MAX_ERROR_BODY_BYTES)));
            assert!(body.len() < MAX_ERROR_BODY_BYTES + 64);
            assert!(body.ends_with("(19488 bytes truncated)"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn test_truncate_body_respects_char_boundaries() {
    assert_eq!(truncate_body("short"), "short");

    // 'é' is two bytes, so byte 512 falls inside a character
    let body = format!("a{}", "é".repeat(400));
    let cut = truncate_body(&body);
    assert!(cut.starts_with('a'));
    assert!(cut.contains("... ("));
}

#[tokio::test]
async fn test_http_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(50))
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .get_json_with_config::<Value>(&mock_server.uri(), RequestConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
    assert_eq!(err.kind(), ErrorKind::Fetch);
}

#[tokio::test]
async fn test_http_client_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = default_client()
        .get_json_with_config::<Value>(&mock_server.uri(), RequestConfig::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::JsonParse(_)));
}

// ============================================================================
// Open-Meteo Tests
// ============================================================================

fn forecast_url(server: &MockServer) -> String {
    format!("{}/v1/forecast", server.uri())
}

#[tokio::test]
async fn test_fetch_current_sends_expected_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5074"))
        .and(query_param("longitude", "-0.1278"))
        .and(query_param("current", CURRENT_VARIABLES.join(",")))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone": "Europe/London",
            "current": {"temperature_2m": 8.4, "weather_code": 3}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(forecast_url(&mock_server), DEFAULT_TIMEOUT).unwrap();
    let response = client.fetch_current(51.5074, -0.1278).await.unwrap();

    assert_eq!(response["current"]["weather_code"], 3);
}

#[tokio::test]
async fn test_fetch_current_status_is_fetch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(forecast_url(&mock_server), DEFAULT_TIMEOUT).unwrap();
    let err = client.fetch_current(0.0, 0.0).await.unwrap_err();

    assert!(err.is_fetch_failure());
    assert!(err.to_string().contains("503"));
    assert!(err.to_string().contains("Service Unavailable"));
}

#[tokio::test]
async fn test_fetch_current_non_json_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = OpenMeteoClient::new(forecast_url(&mock_server), DEFAULT_TIMEOUT).unwrap();
    let err = client.fetch_current(0.0, 0.0).await.unwrap_err();

    assert!(err.is_malformed_response());
}

#[tokio::test]
async fn test_fetch_current_connection_refused() {
    // Bind then drop a listener to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client =
        OpenMeteoClient::new(format!("http://127.0.0.1:{port}/v1/forecast"), DEFAULT_TIMEOUT)
            .unwrap();
    let err = client.fetch_current(0.0, 0.0).await.unwrap_err();

    assert!(err.is_fetch_failure());
}

#[test]
fn test_open_meteo_rejects_invalid_url() {
    let err = OpenMeteoClient::new("not a url", DEFAULT_TIMEOUT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}
