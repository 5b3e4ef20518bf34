//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: weather API → normalize → Parquet →
//! partitioned local storage → transform job.

use arrow::array::{Array, Float64Array, StringArray};
use serde_json::json;
use std::path::Path;
use weather_ingest::catalog::{TableDefinition, DEFAULT_DATABASE, DEFAULT_TABLE};
use weather_ingest::output::{decode_parquet, CloudDestination};
use weather_ingest::transform::{TransformJob, FAHRENHEIT_COLUMN};
use weather_ingest::{IngestConfig, Ingestor, StorageKey};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_meteo_response(temperature: f64, code: i32) -> serde_json::Value {
    json!({
        "latitude": 40.710335,
        "longitude": -73.99307,
        "generationtime_ms": 0.05,
        "utc_offset_seconds": -14400,
        "timezone": "America/New_York",
        "timezone_abbreviation": "EDT",
        "elevation": 32.0,
        "current_units": {"temperature_2m": "°C", "visibility": "m"},
        "current": {
            "time": "2024-06-01T08:00",
            "interval": 900,
            "temperature_2m": temperature,
            "relative_humidity_2m": 64,
            "apparent_temperature": temperature - 1.5,
            "pressure_msl": 1016.2,
            "wind_speed_10m": 11.3,
            "wind_direction_10m": 200,
            "cloud_cover": 0,
            "visibility": 10432.0,
            "weather_code": code
        }
    })
}

fn new_york_config(server: &MockServer, bucket: &Path) -> IngestConfig {
    IngestConfig::from_lookup(|key| match key {
        "WEATHER_API_URL" => Some(format!("{}/v1/forecast", server.uri())),
        "S3_BUCKET" => Some(bucket.display().to_string()),
        "LATITUDE" => Some("40.7128".to_string()),
        "LONGITUDE" => Some("-74.0060".to_string()),
        "CITY" => Some("New York".to_string()),
        "COUNTRY_CODE" => Some("US".to_string()),
        _ => None,
    })
    .unwrap()
}

// ============================================================================
// End-to-End Ingestion
// ============================================================================

#[tokio::test]
async fn test_ingest_to_local_destination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "40.7128"))
        .and(query_param("longitude", "-74.006"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_response(21.4, 61)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ingestor = Ingestor::new(new_york_config(&server, dir.path())).unwrap();

    let result = ingestor.invoke(&json!({})).await;
    assert_eq!(result.status_code, 200, "body: {}", result.body);

    let body = result.body_json().unwrap();
    assert_eq!(body["message"], "Weather data successfully ingested");
    assert_eq!(body["city"], "New York");
    assert_eq!(body["country_code"], "US");

    let location = body["s3_location"].as_str().unwrap();
    assert!(location.starts_with("file://"));

    // The object sits under the hour partition on disk
    let relative = location
        .strip_prefix(&format!("file://{}/", dir.path().display()))
        .unwrap();
    let key = StorageKey::parse(relative).unwrap();
    assert!(key.file_name().starts_with("new_york_us_"));
    assert!(dir.path().join(key.as_str()).exists());

    let data = std::fs::read(dir.path().join(key.as_str())).unwrap();
    let batches = decode_parquet(data.into()).unwrap();
    let batch = &batches[0];
    assert_eq!(batch.num_rows(), 1);
    assert_eq!(batch.num_columns(), 21);

    let description = batch
        .column_by_name("weather_description")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(description.value(0), "Slight rain");

    let timezone = batch
        .column_by_name("timezone")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(timezone.value(0), "America/New_York");
}

#[tokio::test]
async fn test_each_invocation_writes_its_own_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_response(5.0, 0)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ingestor = Ingestor::new(new_york_config(&server, dir.path())).unwrap();

    let first = ingestor.invoke(&json!({"city": "Boston"})).await;
    let second = ingestor.invoke(&json!({"city": "Chicago"})).await;
    assert!(first.is_success());
    assert!(second.is_success());

    let destination = CloudDestination::parse(dir.path().to_str().unwrap()).unwrap();
    let keys = destination.list(None).await.unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().any(|k| k.contains("/boston_us_")));
    assert!(keys.iter().any(|k| k.contains("/chicago_us_")));
}

#[tokio::test]
async fn test_upstream_503_leaves_destination_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let ingestor = Ingestor::new(new_york_config(&server, dir.path())).unwrap();

    let result = ingestor.invoke(&json!({})).await;
    assert_eq!(result.status_code, 500);
    assert!(result.body.contains("Failed to fetch weather data"));

    let destination = CloudDestination::parse(dir.path().to_str().unwrap()).unwrap();
    assert!(destination.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unset_bucket_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_response(5.0, 0)))
        .expect(0)
        .mount(&server)
        .await;

    let config = IngestConfig::from_lookup(|key| match key {
        "WEATHER_API_URL" => Some(format!("{}/v1/forecast", server.uri())),
        _ => None,
    })
    .unwrap();
    let ingestor = Ingestor::new(config).unwrap();

    let result = ingestor.invoke(&json!({})).await;
    assert_eq!(result.status_code, 500);

    let body = result.body_json().unwrap();
    assert!(body["error"].as_str().unwrap().contains("S3_BUCKET"));
    assert_eq!(body["message"], "Failed to ingest weather data");
}

// ============================================================================
// Transform + Catalog
// ============================================================================

#[tokio::test]
async fn test_ingest_then_transform() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("latitude", "40.7128"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_response(25.0, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("latitude", "64.1466"))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_meteo_response(-4.0, 71)))
        .mount(&server)
        .await;

    let raw = tempfile::tempdir().unwrap();
    let processed = tempfile::tempdir().unwrap();
    let ingestor = Ingestor::new(new_york_config(&server, raw.path())).unwrap();

    assert!(ingestor.invoke(&json!({})).await.is_success());
    let reykjavik = json!({
        "latitude": 64.1466,
        "longitude": -21.9426,
        "city": "Reykjavik",
        "country_code": "IS"
    });
    assert!(ingestor.invoke(&reykjavik).await.is_success());

    let source = CloudDestination::parse(raw.path().to_str().unwrap()).unwrap();
    let output = CloudDestination::parse(processed.path().to_str().unwrap()).unwrap();
    let stats = TransformJob::new(source, output.clone())
        .run(None)
        .await
        .unwrap();

    assert_eq!(stats.objects_read, 2);
    assert_eq!(stats.objects_written, 1);
    assert_eq!(stats.rows_written, 1);

    let keys = output.list(None).await.unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].contains("/new_york_us_"));

    let batches = decode_parquet(output.read(&keys[0]).await.unwrap()).unwrap();
    let fahrenheit = batches[0]
        .column_by_name(FAHRENHEIT_COLUMN)
        .unwrap()
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert!((fahrenheit.value(0) - 77.0).abs() < 1e-9);
}

#[test]
fn test_catalog_matches_written_layout() {
    let key = StorageKey::parse(
        "year=2024/month=03/day=05/hour=07/new_york_us_20240305_070933.parquet",
    )
    .unwrap();
    let table = TableDefinition::new(DEFAULT_DATABASE, DEFAULT_TABLE, "s3://weather-bucket");

    let ddl = table.create_table_ddl();
    assert!(ddl.contains("PARTITIONED BY"));
    assert!(ddl.contains("s3://weather-bucket/"));

    let add = table.add_partition_sql(key.partition());
    assert!(add.contains("year='2024'"));
    assert!(add.contains("hour='07'"));
}
