//! Partition key module
//!
//! Derives Hive-style, hour-partitioned storage keys for encoded records.
//!
//! # Overview
//!
//! Every ingested object lands at
//! `year=YYYY/month=MM/day=DD/hour=HH/{city}_{country}_{YYYYMMDD_HHMMSS}.parquet`
//! so the catalog can prune by the four partition columns.

mod key;

pub use key::{city_slug, PartitionPath, StorageKey, PARQUET_EXTENSION, PARTITION_COLUMNS};
