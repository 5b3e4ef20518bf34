// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # weather-ingest
//!
//! Scheduled weather ingestion: fetch current conditions from Open-Meteo,
//! normalize them into a fixed-shape record, encode as Parquet and write the
//! object under an hour-partitioned key that a Hive-style catalog can query.
//!
//! ## Features
//!
//! - **Schema Normalizer**: Open-Meteo `current` block → 21-column `WeatherRecord`
//! - **Partition Keys**: `year=/month=/day=/hour=` prefixes with deterministic file names
//! - **Parquet Output**: Snappy-compressed Arrow/Parquet, one object per invocation
//! - **Object Storage**: S3, R2, GCS, Azure or local paths via `object_store`
//! - **Catalog**: Glue table input and Athena DDL for the written layout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weather_ingest::{config::IngestConfig, ingest::Ingestor, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let ingestor = Ingestor::new(config)?;
//!
//!     let result = ingestor.invoke(&serde_json::json!({"city": "Paris"})).await;
//!     println!("{} {}", result.status_code, result.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            Trigger: schedule / HTTP /invoke / Lambda            │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   HTTP   │ Normalize │    Output     │ Partition │   Storage   │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ GET      │ WMO codes │ Arrow batch   │ year=     │ S3 / R2     │
//! │ 10s      │ Presence  │ Parquet       │ month=    │ GCS / Azure │
//! │ timeout  │ semantics │ (Snappy)      │ day= hour=│ Local       │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Configuration and invocation overrides
pub mod config;

/// Weather API HTTP client
pub mod http;

/// Response normalization
pub mod normalize;

/// Partitioned storage keys
pub mod partition;

/// Catalog table definition
pub mod catalog;

/// Arrow/Parquet output and object storage
pub mod output;

/// One invocation of the pipeline
pub mod ingest;

/// Post-ingestion transform job
pub mod transform;

/// Command-line interface
pub mod cli;

/// AWS Lambda entrypoint
#[cfg(feature = "lambda")]
pub mod lambda;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{IngestConfig, InvocationOverrides};
pub use ingest::{Ingestor, InvocationResult};
pub use partition::StorageKey;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
