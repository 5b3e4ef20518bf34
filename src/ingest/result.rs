//! Invocation outcome and result types

use crate::error::Error;
use crate::partition::StorageKey;
use crate::types::{JsonValue, WeatherRecord};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Message returned on success
pub const SUCCESS_MESSAGE: &str = "Weather data successfully ingested";

/// Message returned on failure
pub const FAILURE_MESSAGE: &str = "Failed to ingest weather data";

/// What a successful invocation produced
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The record that was written
    pub record: WeatherRecord,
    /// The key it was written under
    pub key: StorageKey,
    /// Full location of the written object, e.g. `s3://bucket/year=.../x.parquet`
    pub location: String,
    /// Encoded object size in bytes
    pub bytes_written: usize,
}

impl IngestOutcome {
    /// Success body document
    pub fn body(&self) -> JsonValue {
        json!({
            "message": SUCCESS_MESSAGE,
            "city": self.record.city,
            "country_code": self.record.country_code,
            "latitude": self.record.latitude,
            "longitude": self.record.longitude,
            "s3_location": self.location,
            "timestamp": self.record.timestamp_iso(),
        })
    }
}

/// Result of one invocation as reported to the trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// 200 on success, 500 on any failure
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON document rendered as a string
    pub body: String,
}

impl InvocationResult {
    /// Build a 200 result from an outcome
    pub fn success(outcome: &IngestOutcome) -> Self {
        Self {
            status_code: 200,
            body: outcome.body().to_string(),
        }
    }

    /// Build a 500 result from an error
    pub fn failure(error: &Error) -> Self {
        Self {
            status_code: 500,
            body: json!({
                "error": error.to_string(),
                "message": FAILURE_MESSAGE,
            })
            .to_string(),
        }
    }

    /// Whether the invocation succeeded
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Parse the body back into a JSON document
    pub fn body_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::from_str(&self.body)
    }
}
