//! Open-Meteo current-conditions client

use super::client::{HttpClient, HttpClientConfig, RequestConfig};
use crate::error::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Default Open-Meteo forecast endpoint
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Variables requested in the `current` block
pub const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "pressure_msl",
    "wind_speed_10m",
    "wind_direction_10m",
    "cloud_cover",
    "visibility",
    "weather_code",
];

/// Client for the Open-Meteo forecast API
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: HttpClient,
    url: String,
}

impl OpenMeteoClient {
    /// Create a client for the given endpoint with a fixed request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        url::Url::parse(&url)
            .map_err(|e| Error::invalid_value("WEATHER_API_URL", format!("{url}: {e}")))?;

        let config = HttpClientConfig::builder()
            .timeout(timeout)
            .header("Accept", "application/json")
            .build();

        Ok(Self {
            http: HttpClient::with_config(config)?,
            url,
        })
    }

    /// The endpoint this client calls
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Query parameters for a current-conditions request
    pub fn current_query(latitude: f64, longitude: f64) -> RequestConfig {
        RequestConfig::new()
            .query("latitude", latitude.to_string())
            .query("longitude", longitude.to_string())
            .query("current", CURRENT_VARIABLES.join(","))
            .query("timezone", "auto")
            .query("forecast_days", "1")
    }

    /// Fetch current conditions for a coordinate
    ///
    /// Transport errors, timeouts and non-success statuses are reported as
    /// [`Error::Fetch`] with the upstream error text. A body that is not JSON
    /// is reported as [`Error::MalformedResponse`].
    pub async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<Value> {
        info!("Fetching weather data for lat={latitude}, lon={longitude}");

        let response: Value = self
            .http
            .get_json_with_config(&self.url, Self::current_query(latitude, longitude))
            .await
            .map_err(|e| match e {
                Error::JsonParse(inner) => {
                    Error::malformed(format!("response is not JSON: {inner}"))
                }
                other => Error::fetch(other.to_string()),
            })?;

        debug!("Weather API response: {}", response);
        Ok(response)
    }
}
