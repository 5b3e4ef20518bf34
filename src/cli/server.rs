//! HTTP server mode: trigger ingestion over REST

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::schedule::shutdown_signal;
use crate::catalog::{arrow_schema, PARTITION_KEYS, WEATHER_COLUMNS};
use crate::error::{Error, Result};
use crate::ingest::{Ingestor, InvocationResult};

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    ingestor: Arc<Ingestor>,
}

/// Build the router
pub fn router(ingestor: Arc<Ingestor>) -> Router {
    let state = AppState { ingestor };

    // Allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/schema", get(schema))
        .route("/invoke", post(invoke))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(ingestor: Arc<Ingestor>, port: u16) -> Result<()> {
    let app = router(ingestor);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

/// Catalog columns and partition keys
async fn schema() -> impl IntoResponse {
    let fields: Vec<Value> = arrow_schema()
        .fields()
        .iter()
        .map(|f| json!({ "name": f.name(), "arrow_type": f.data_type().to_string() }))
        .collect();

    Json(json!({
        "columns": WEATHER_COLUMNS,
        "partition_keys": PARTITION_KEYS,
        "arrow": fields,
    }))
}

/// Run one invocation; the body is the invocation event
///
/// An empty body is an event without overrides. A body that is not JSON is
/// rejected with 400 before any fetch.
async fn invoke(State(state): State<Arc<AppState>>, body: String) -> impl IntoResponse {
    let event = match parse_event(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Rejected invocation event: {e}");
            let result = InvocationResult::failure(&e);
            let body = result.body_json().unwrap_or(Value::String(result.body));
            return (StatusCode::BAD_REQUEST, Json(body));
        }
    };
    let result = state.ingestor.invoke(&event).await;

    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = result.body_json().unwrap_or(Value::String(result.body));

    (status, Json(body))
}

/// Parse a request body into an invocation event
fn parse_event(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body)
        .map_err(|e| Error::invalid_value("event", format!("request body is not JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::output::CloudDestination;
    use axum::body::Body;
    use axum::http::Request;
    use object_store::memory::InMemory;
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let ingestor = Arc::new(Ingestor::new(IngestConfig::default()).unwrap());
        let response = router(ingestor)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_schema_lists_catalog() {
        let ingestor = Arc::new(Ingestor::new(IngestConfig::default()).unwrap());
        let response = router(ingestor)
            .oneshot(Request::get("/schema").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["columns"].as_array().unwrap().len(), 21);
        assert_eq!(body["partition_keys"].as_array().unwrap().len(), 4);
        assert_eq!(body["columns"][0]["Name"], "timestamp");
    }

    #[tokio::test]
    async fn test_invoke_without_bucket_skips_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let config =
            IngestConfig::default().with_weather_api_url(format!("{}/v1/forecast", server.uri()));
        let ingestor = Arc::new(Ingestor::new(config).unwrap());

        let response = router(ingestor)
            .oneshot(Request::post("/invoke").body(Body::from("{}")).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to ingest weather data");
    }

    #[tokio::test]
    async fn test_invoke_with_overrides() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("latitude", "35.6762"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "timezone": "Asia/Tokyo",
                "current": {"temperature_2m": 18.0, "weather_code": 0}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config =
            IngestConfig::default().with_weather_api_url(format!("{}/v1/forecast", server.uri()));
        let destination =
            CloudDestination::from_store(Arc::new(InMemory::new()), "s3", "bucket", "raw");
        let ingestor = Arc::new(Ingestor::new(config).unwrap().with_destination(destination));

        let event = json!({
            "latitude": 35.6762,
            "longitude": 139.6503,
            "city": "Tokyo",
            "country_code": "JP"
        });
        let response = router(ingestor)
            .oneshot(
                Request::post("/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["city"], "Tokyo");
        assert!(body["s3_location"]
            .as_str()
            .unwrap()
            .starts_with("s3://bucket/raw/year="));
    }

    #[tokio::test]
    async fn test_invoke_with_empty_body_uses_defaults() {
        let ingestor = Arc::new(Ingestor::new(IngestConfig::default()).unwrap());
        let response = router(ingestor)
            .oneshot(Request::post("/invoke").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // No bucket configured, still a structured failure
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invoke_rejects_truncated_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current": {"temperature_2m": 18.0, "weather_code": 0}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let config =
            IngestConfig::default().with_weather_api_url(format!("{}/v1/forecast", server.uri()));
        let store = Arc::new(InMemory::new());
        let destination = CloudDestination::from_store(store.clone(), "s3", "bucket", "raw");
        let ingestor = Arc::new(Ingestor::new(config).unwrap().with_destination(destination));

        let response = router(ingestor)
            .oneshot(
                Request::post("/invoke")
                    .body(Body::from(r#"{"city": "Tokyo", "latitude": 35.6"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Failed to ingest weather data");
        assert!(body["error"].as_str().unwrap().contains("not JSON"));

        let reader = CloudDestination::from_store(store, "s3", "bucket", "raw");
        assert!(reader.list(None).await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_event() {
        assert_eq!(parse_event("").unwrap(), Value::Null);
        assert_eq!(parse_event("  \n").unwrap(), Value::Null);
        assert_eq!(parse_event(r#"{"city": "Oslo"}"#).unwrap()["city"], "Oslo");
        assert!(parse_event("city=Oslo").is_err());
    }
}
