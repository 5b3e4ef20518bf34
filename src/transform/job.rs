//! Batch job over ingested objects

use super::batch::transform_batch;
use crate::error::{Result, ResultExt};
use crate::output::{decode_parquet, encode_parquet, CloudDestination, ParquetWriterConfig};
use crate::partition::StorageKey;
use arrow::compute::concat_batches;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Counters reported by a transform run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    /// Objects read from the source
    pub objects_read: usize,
    /// Objects written to the output
    pub objects_written: usize,
    /// Objects skipped because their key is not partitioned
    pub objects_skipped: usize,
    /// Rows decoded from the source
    pub rows_read: usize,
    /// Rows written after filtering
    pub rows_written: usize,
}

/// Reads ingested objects, filters and enriches them, writes them back out
/// under the same partitioned key
#[derive(Debug, Clone)]
pub struct TransformJob {
    source: CloudDestination,
    output: CloudDestination,
    parquet: ParquetWriterConfig,
}

impl TransformJob {
    /// Create a job between two destinations
    pub fn new(source: CloudDestination, output: CloudDestination) -> Self {
        Self {
            source,
            output,
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Replace the Parquet writer settings
    #[must_use]
    pub fn with_parquet_config(mut self, config: ParquetWriterConfig) -> Self {
        self.parquet = config;
        self
    }

    /// Transform every `.parquet` object under `prefix`
    ///
    /// Objects left with no rows after filtering are not written.
    pub async fn run(&self, prefix: Option<&str>) -> Result<TransformStats> {
        let keys = self.source.list(prefix).await?;
        info!("Transforming {} objects", keys.len());

        let mut stats = TransformStats::default();

        for key in keys {
            if let Err(e) = StorageKey::parse(&key) {
                warn!("Skipping {key}: {e}");
                stats.objects_skipped += 1;
                continue;
            }

            let data = self
                .source
                .read(&key)
                .await
                .with_context(|| format!("Failed to read {key}"))?;
            let batches = decode_parquet(data).with_context(|| format!("Failed to decode {key}"))?;
            stats.objects_read += 1;

            let Some(first) = batches.first() else {
                debug!("{key} is empty");
                continue;
            };
            let schema = first.schema();
            let batch = concat_batches(&schema, &batches)?;
            stats.rows_read += batch.num_rows();

            let transformed = transform_batch(&batch)?;
            if transformed.num_rows() == 0 {
                debug!("{key}: no rows above freezing");
                continue;
            }

            let encoded = encode_parquet(&transformed, Some(&self.parquet))?;
            let location = self.output.write(&key, encoded).await?;
            debug!("Wrote {} rows to {location}", transformed.num_rows());

            stats.objects_written += 1;
            stats.rows_written += transformed.num_rows();
        }

        info!(
            "Transform finished: {} read, {} written, {} skipped",
            stats.objects_read, stats.objects_written, stats.objects_skipped
        );
        Ok(stats)
    }
}
