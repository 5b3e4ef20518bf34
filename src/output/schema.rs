//! WeatherRecord to Arrow conversion
//!
//! Builds one column per catalog column, in catalog order.

use crate::catalog::arrow_schema;
use crate::error::{Error, Result};
use crate::types::WeatherRecord;
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Convert records to a RecordBatch with the catalog schema
pub fn records_to_batch(records: &[WeatherRecord]) -> Result<RecordBatch> {
    let timestamps = TimestampMicrosecondArray::from_iter_values(
        records.iter().map(|r| r.timestamp.timestamp_micros()),
    )
    .with_timezone("UTC");

    let columns: Vec<ArrayRef> = vec![
        Arc::new(timestamps),
        utf8(records, |r| &r.city),
        utf8(records, |r| &r.country_code),
        int32(records, |r| r.weather_id),
        utf8(records, |r| &r.weather_main),
        utf8(records, |r| &r.weather_description),
        float64(records, |r| r.temperature),
        float64(records, |r| r.feels_like),
        float64(records, |r| r.temp_min),
        float64(records, |r| r.temp_max),
        int32(records, |r| r.pressure),
        int32(records, |r| r.humidity),
        int32(records, |r| r.visibility),
        float64(records, |r| r.wind_speed),
        int32(records, |r| r.wind_deg),
        int32(records, |r| r.clouds),
        int64(records, |r| r.sunrise),
        int64(records, |r| r.sunset),
        utf8(records, |r| &r.timezone),
        float64(records, |r| Some(r.latitude)),
        float64(records, |r| Some(r.longitude)),
    ];

    RecordBatch::try_new(arrow_schema(), columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

fn utf8(records: &[WeatherRecord], f: impl Fn(&WeatherRecord) -> &str) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(records.iter().map(f)))
}

fn int32(records: &[WeatherRecord], f: impl Fn(&WeatherRecord) -> Option<i32>) -> ArrayRef {
    Arc::new(records.iter().map(f).collect::<Int32Array>())
}

fn int64(records: &[WeatherRecord], f: impl Fn(&WeatherRecord) -> Option<i64>) -> ArrayRef {
    Arc::new(records.iter().map(f).collect::<Int64Array>())
}

fn float64(records: &[WeatherRecord], f: impl Fn(&WeatherRecord) -> Option<f64>) -> ArrayRef {
    Arc::new(records.iter().map(f).collect::<Float64Array>())
}
