//! Response → record mapping

use super::codes::{describe_code, WeatherCategory};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue, Location, WeatherRecord};
use chrono::{DateTime, Utc};

/// Normalize an Open-Meteo response into a `WeatherRecord`.
///
/// A missing `current` object is not fatal: every field derived from it is
/// null. Optional numerics use presence, not truthiness, so a reported `0`
/// stays `0` while an absent field becomes null.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] when the response is not an object,
/// when `current` is not an object, when a field has the wrong JSON type, or
/// when an integer field does not fit in `i32`.
pub fn normalize(
    response: &JsonValue,
    location: &Location,
    captured_at: DateTime<Utc>,
) -> Result<WeatherRecord> {
    let root = response
        .as_object()
        .ok_or_else(|| Error::malformed("response body is not a JSON object"))?;

    let current = match root.get("current") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(obj)) => Some(obj),
        Some(_) => return Err(Error::malformed("'current' is not an object")),
    };

    let weather_id = optional_int(current, "weather_code")?;
    let temperature = optional_number(current, "temperature_2m")?;

    let timezone = match root.get("timezone") {
        None | Some(JsonValue::Null) => "UTC".to_string(),
        Some(JsonValue::String(tz)) => tz.clone(),
        Some(_) => return Err(Error::malformed("'timezone' is not a string")),
    };

    Ok(WeatherRecord {
        timestamp: captured_at,
        city: location.city.clone(),
        country_code: location.country_code.clone(),
        weather_id,
        weather_main: WeatherCategory::from_code(weather_id).as_str().to_string(),
        weather_description: describe_code(weather_id).to_string(),
        temperature,
        feels_like: optional_number(current, "apparent_temperature")?,
        // Current conditions carry no separate range
        temp_min: temperature,
        temp_max: temperature,
        pressure: optional_int(current, "pressure_msl")?,
        humidity: optional_int(current, "relative_humidity_2m")?,
        visibility: optional_number(current, "visibility")?
            .map(|meters| to_i32("visibility", meters / 1000.0))
            .transpose()?,
        wind_speed: optional_number(current, "wind_speed_10m")?,
        wind_deg: optional_int(current, "wind_direction_10m")?,
        clouds: optional_int(current, "cloud_cover")?,
        sunrise: None,
        sunset: None,
        timezone,
        latitude: location.latitude,
        longitude: location.longitude,
    })
}

/// Read a numeric field from `current`; absent or null yields `None`
fn optional_number(current: Option<&JsonObject>, field: &str) -> Result<Option<f64>> {
    let Some(obj) = current else {
        return Ok(None);
    };

    match obj.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n.as_f64().map(Some).ok_or_else(|| {
            Error::malformed(format!("'current.{field}' is not representable as f64"))
        }),
        Some(other) => Err(Error::malformed(format!(
            "'current.{field}' is not a number: {other}"
        ))),
    }
}

/// Read a numeric field and truncate it toward zero
fn optional_int(current: Option<&JsonObject>, field: &str) -> Result<Option<i32>> {
    optional_number(current, field)?
        .map(|v| to_i32(field, v))
        .transpose()
}

/// Truncate toward zero; values outside the `i32` range are malformed
fn to_i32(field: &str, value: f64) -> Result<i32> {
    let truncated = value.trunc();
    if truncated < f64::from(i32::MIN) || truncated > f64::from(i32::MAX) {
        return Err(Error::malformed(format!(
            "'current.{field}' is out of range: {value}"
        )));
    }
    Ok(truncated as i32)
}
