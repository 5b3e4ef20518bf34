//! Transform module
//!
//! Post-processing over ingested Parquet objects: keep observations above
//! freezing and add a Fahrenheit column, preserving the partition layout.

mod batch;
mod job;

pub use batch::{celsius_to_fahrenheit, transform_batch, FAHRENHEIT_COLUMN};
pub use job::{TransformJob, TransformStats};
