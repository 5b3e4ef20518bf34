//! Common types used throughout weather ingestion
//!
//! This module contains the record shape written to storage and the
//! location metadata that travels with every invocation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Location
// ============================================================================

/// Where an observation is taken, plus caller-supplied labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// City label (metadata only, not sent to the API)
    pub city: String,
    /// Country code label (metadata only, not sent to the API)
    pub country_code: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            latitude: 51.5074,
            longitude: -0.1278,
            city: "London".to_string(),
            country_code: "GB".to_string(),
        }
    }
}

// ============================================================================
// Weather Record
// ============================================================================

/// One observation at one place and time.
///
/// Field order matches the catalog column order exactly. Adding a field here
/// requires adding the matching column in `catalog::WEATHER_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Capture time (invocation time, UTC)
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub country_code: String,
    /// WMO weather interpretation code
    pub weather_id: Option<i32>,
    /// Coarse category (Clear, Clouds, Rain, Snow, Thunderstorm, Other)
    pub weather_main: String,
    pub weather_description: String,
    /// Temperature in °C
    pub temperature: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// Mean sea level pressure in hPa, truncated
    pub pressure: Option<i32>,
    /// Relative humidity in percent
    pub humidity: Option<i32>,
    /// Visibility in kilometers, truncated
    pub visibility: Option<i32>,
    pub wind_speed: Option<f64>,
    /// Wind direction in degrees
    pub wind_deg: Option<i32>,
    /// Cloud cover in percent
    pub clouds: Option<i32>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl WeatherRecord {
    /// Capture time formatted as ISO-8601 with microseconds and a `Z` suffix
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}
