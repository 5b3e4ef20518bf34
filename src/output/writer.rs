//! Parquet writer
//!
//! Provides utilities for writing Arrow RecordBatches as Parquet, either to
//! an in-memory buffer (for object storage uploads) or to a local file.

use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Get compression algorithm
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Parquet writer over any `Write` sink
pub struct ParquetWriter<W: Write + Send = File> {
    /// Arrow writer
    writer: ArrowWriter<W>,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter<File> {
    /// Create a Parquet writer for a new local file
    pub fn create(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let file = File::create(path.as_ref()).map_err(|e| Error::Output {
            message: format!("Failed to create file: {e}"),
        })?;
        Self::new(file, schema, config)
    }
}

impl ParquetWriter<Vec<u8>> {
    /// Create a Parquet writer that encodes into memory
    pub fn in_memory(schema: &Schema, config: &ParquetWriterConfig) -> Result<Self> {
        Self::new(Vec::new(), schema, config)
    }
}

impl<W: Write + Send> ParquetWriter<W> {
    /// Create a new Parquet writer over a sink
    pub fn new(sink: W, schema: &Schema, config: &ParquetWriterConfig) -> Result<Self> {
        let props = config.build_properties();
        let writer =
            ArrowWriter::try_new(sink, Arc::new(schema.clone()), Some(props)).map_err(|e| {
                Error::Output {
                    message: format!("Failed to create Parquet writer: {e}"),
                }
            })?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch).map_err(|e| Error::Output {
            message: format!("Failed to write batch: {e}"),
        })?;

        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file, returning the row count
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close().map_err(|e| Error::Output {
            message: format!("Failed to close Parquet writer: {e}"),
        })?;
        Ok(rows)
    }

    /// Finalize and return the underlying sink
    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| Error::Output {
            message: format!("Failed to finalize Parquet writer: {e}"),
        })
    }
}

/// Encode a RecordBatch as Parquet bytes
pub fn encode_parquet(batch: &RecordBatch, config: Option<&ParquetWriterConfig>) -> Result<Bytes> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::in_memory(batch.schema().as_ref(), config)?;
    writer.write(batch)?;
    Ok(Bytes::from(writer.into_inner()?))
}

/// Write a single RecordBatch to a Parquet file
pub fn write_batch_to_parquet(
    path: impl AsRef<Path>,
    batch: &RecordBatch,
    config: Option<&ParquetWriterConfig>,
) -> Result<usize> {
    let default_config = ParquetWriterConfig::default();
    let config = config.unwrap_or(&default_config);

    let mut writer = ParquetWriter::create(path, batch.schema().as_ref(), config)?;
    writer.write(batch)?;
    writer.close()
}
