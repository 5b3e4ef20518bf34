//! Ingestion configuration
//!
//! `IngestConfig` is built once at process start (environment, optional YAML
//! file) and shared read-only by every invocation. Per-invocation location
//! overrides come from the trigger event as `InvocationOverrides`.

use crate::error::{Error, Result};
use crate::http::DEFAULT_WEATHER_API_URL;
use crate::types::{JsonValue, Location};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Environment Variables
// ============================================================================

/// Weather API endpoint
pub const ENV_WEATHER_API_URL: &str = "WEATHER_API_URL";
/// Destination bucket name or URL
pub const ENV_BUCKET: &str = "S3_BUCKET";
/// Default latitude
pub const ENV_LATITUDE: &str = "LATITUDE";
/// Default longitude
pub const ENV_LONGITUDE: &str = "LONGITUDE";
/// Default city label
pub const ENV_CITY: &str = "CITY";
/// Default country code label
pub const ENV_COUNTRY_CODE: &str = "COUNTRY_CODE";
/// Weather API request timeout in seconds
pub const ENV_TIMEOUT_SECS: &str = "WEATHER_API_TIMEOUT_SECS";

/// Default weather API request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Ingest Config
// ============================================================================

/// Process-wide ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Weather API endpoint
    pub weather_api_url: String,

    /// Destination: a bare bucket name, an object store URL, or a local path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    /// Default location, overridable per invocation
    pub location: Location,

    /// Weather API request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            bucket: None,
            location: Location::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl IngestConfig {
    /// Build a config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults plus a variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::default().merge_lookup(lookup)
    }

    /// Load a config from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a config from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Override fields with any variables the lookup provides
    ///
    /// Empty values are treated as unset.
    pub fn merge_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_WEATHER_API_URL) {
            self.weather_api_url = url;
        }
        if let Some(bucket) = get(ENV_BUCKET) {
            self.bucket = Some(bucket);
        }
        if let Some(lat) = get(ENV_LATITUDE) {
            self.location.latitude = parse_number(ENV_LATITUDE, &lat)?;
        }
        if let Some(lon) = get(ENV_LONGITUDE) {
            self.location.longitude = parse_number(ENV_LONGITUDE, &lon)?;
        }
        if let Some(city) = get(ENV_CITY) {
            self.location.city = city;
        }
        if let Some(code) = get(ENV_COUNTRY_CODE) {
            self.location.country_code = code;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs
                .trim()
                .parse()
                .map_err(|e| Error::invalid_value(ENV_TIMEOUT_SECS, format!("'{secs}': {e}")))?;
        }

        Ok(self)
    }

    /// Set the destination
    #[must_use]
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Set the weather API endpoint
    #[must_use]
    pub fn with_weather_api_url(mut self, url: impl Into<String>) -> Self {
        self.weather_api_url = url.into();
        self
    }

    /// Set the default location
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Validate the config
    ///
    /// The destination is not checked here; a missing bucket is reported per
    /// invocation so a misconfigured deployment still answers with a result.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.weather_api_url).map_err(|e| {
            Error::invalid_value(ENV_WEATHER_API_URL, format!("{}: {e}", self.weather_api_url))
        })?;
        validate_location(&self.location)?;
        if self.request_timeout_secs == 0 {
            return Err(Error::invalid_value(ENV_TIMEOUT_SECS, "must be greater than zero"));
        }
        Ok(())
    }

    /// Request timeout for the weather API
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the destination URL
    ///
    /// A bare bucket name maps to `s3://{bucket}`. URLs with a scheme and
    /// local paths are used as given.
    pub fn destination_url(&self) -> Result<String> {
        let bucket = self
            .bucket
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::missing_field(ENV_BUCKET))?;

        if bucket.contains("://") || bucket.starts_with('/') || bucket.starts_with('.') {
            Ok(bucket.to_string())
        } else {
            Ok(format!("s3://{bucket}"))
        }
    }
}

/// Check latitude and longitude ranges
pub fn validate_location(location: &Location) -> Result<()> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(Error::invalid_value(
            "latitude",
            format!("{} is outside [-90, 90]", location.latitude),
        ));
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(Error::invalid_value(
            "longitude",
            format!("{} is outside [-180, 180]", location.longitude),
        ));
    }
    Ok(())
}

fn parse_number(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::invalid_value(field, format!("'{value}': {e}")))
}

// ============================================================================
// Invocation Overrides
// ============================================================================

/// Per-invocation location overrides carried in the trigger event
///
/// Unknown keys are ignored, so scheduled events deserialize to no overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InvocationOverrides {
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

impl InvocationOverrides {
    /// Extract overrides from an invocation event
    ///
    /// Events that are not JSON objects carry no overrides.
    pub fn from_event(event: &JsonValue) -> Result<Self> {
        if !event.is_object() {
            return Ok(Self::default());
        }
        serde_json::from_value(event.clone())
            .map_err(|e| Error::invalid_value("event", e.to_string()))
    }

    /// Whether any field is overridden
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none()
            && self.longitude.is_none()
            && self.city.is_none()
            && self.country_code.is_none()
    }

    /// Merge these overrides onto a base location
    pub fn apply(&self, base: &Location) -> Location {
        Location {
            latitude: self.latitude.unwrap_or(base.latitude),
            longitude: self.longitude.unwrap_or(base.longitude),
            city: self.city.clone().unwrap_or_else(|| base.city.clone()),
            country_code: self
                .country_code
                .clone()
                .unwrap_or_else(|| base.country_code.clone()),
        }
    }
}

/// Accept a JSON number or a numeric string
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("{n} is not a finite number"))),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("'{s}' is not a number"))),
        Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}
