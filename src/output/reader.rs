//! Parquet decoding

use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// Decode an in-memory Parquet object into RecordBatches
pub fn decode_parquet(data: Bytes) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;

    reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Output {
            message: format!("Failed to decode Parquet batch: {e}"),
        })
}
