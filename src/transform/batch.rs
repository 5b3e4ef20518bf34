//! Row filter and derived Fahrenheit column

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::compute::filter_record_batch;
use arrow::compute::kernels::cmp::gt;
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Name of the derived column
pub const FAHRENHEIT_COLUMN: &str = "temperature_f";

/// Convert Celsius to Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

fn temperature_column(batch: &RecordBatch) -> Result<&Float64Array> {
    batch
        .column_by_name("temperature")
        .ok_or_else(|| Error::output("batch has no 'temperature' column"))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::output("'temperature' column is not Float64"))
}

/// Keep rows with a positive temperature and append `temperature_f`
///
/// Rows with a null temperature are dropped.
pub fn transform_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let positive = gt(temperature_column(batch)?, &Float64Array::new_scalar(0.0))?;
    let filtered = filter_record_batch(batch, &positive)?;

    let fahrenheit = temperature_column(&filtered)?.unary::<_, Float64Type>(celsius_to_fahrenheit);

    let schema = filtered.schema();
    let mut fields: Vec<_> = schema.fields().iter().cloned().collect();
    fields.push(Arc::new(Field::new(FAHRENHEIT_COLUMN, DataType::Float64, true)));
    let schema = Arc::new(Schema::new_with_metadata(fields, schema.metadata().clone()));

    let mut columns: Vec<ArrayRef> = filtered.columns().to_vec();
    columns.push(Arc::new(fahrenheit));

    Ok(RecordBatch::try_new(schema, columns)?)
}
