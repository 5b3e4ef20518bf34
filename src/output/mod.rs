//! Output module
//!
//! Handles Arrow RecordBatch creation, Parquet encoding and object storage.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Converting `WeatherRecord`s to an Arrow RecordBatch with the catalog schema
//! - Encoding RecordBatches as Parquet, in memory or to a file
//! - Decoding Parquet objects back into RecordBatches
//! - Cloud storage output (S3, R2, GCS, Azure, local)

mod cloud;
mod reader;
mod schema;
mod writer;

pub use cloud::CloudDestination;
pub use reader::decode_parquet;
pub use schema::records_to_batch;
pub use writer::{encode_parquet, write_batch_to_parquet, ParquetWriter, ParquetWriterConfig};
