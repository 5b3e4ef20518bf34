//! CLI commands and argument parsing

use crate::catalog::{DEFAULT_DATABASE, DEFAULT_TABLE};
use crate::config::InvocationOverrides;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Weather ingestion pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "weather-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML); environment variables override its values
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one ingestion and print the invocation result
    Ingest {
        #[command(flatten)]
        location: LocationArgs,

        /// Invocation event JSON (location keys override the config)
        #[arg(long)]
        event_json: Option<String>,

        /// Destination bucket name or URL (overrides S3_BUCKET)
        #[arg(short, long)]
        bucket: Option<String>,
    },

    /// Normalize a saved API response and print the record
    Normalize {
        /// File containing the raw API response (JSON)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        location: LocationArgs,

        /// Capture time (RFC 3339), defaults to now
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Print the storage key for a city and time
    Key {
        /// City label
        #[arg(long)]
        city: String,

        /// Country code label
        #[arg(long)]
        country_code: String,

        /// Timestamp (RFC 3339), defaults to now
        #[arg(long)]
        timestamp: Option<String>,
    },

    /// Print the catalog table definition
    Schema {
        /// Output format
        #[arg(short, long, default_value = "ddl")]
        format: SchemaFormat,

        /// Catalog database name
        #[arg(long, default_value = DEFAULT_DATABASE)]
        database: String,

        /// Catalog table name
        #[arg(long, default_value = DEFAULT_TABLE)]
        table: String,

        /// Table location, defaults to the configured destination
        #[arg(long)]
        location: Option<String>,
    },

    /// Filter ingested objects and add a Fahrenheit column
    Transform {
        /// Source destination (local path or cloud URL)
        #[arg(long)]
        source: String,

        /// Output destination (local path or cloud URL)
        /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(short, long)]
        output: String,

        /// Only transform keys under this prefix, e.g. `year=2024/month=03`
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Run ingestion on a fixed interval until interrupted
    Schedule {
        /// Seconds between invocations
        #[arg(long, default_value = "60")]
        interval_secs: u64,

        /// Stop after this many invocations
        #[arg(long)]
        max_runs: Option<u64>,
    },

    /// Start HTTP server mode
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

/// Location flags shared by several commands
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, value_parser = parse_coordinate)]
    pub latitude: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, value_parser = parse_coordinate)]
    pub longitude: Option<f64>,

    /// City label
    #[arg(long)]
    pub city: Option<String>,

    /// Country code label
    #[arg(long)]
    pub country_code: Option<String>,
}

impl LocationArgs {
    /// Flags as invocation overrides
    pub fn overrides(&self) -> InvocationOverrides {
        InvocationOverrides {
            latitude: self.latitude,
            longitude: self.longitude,
            city: self.city.clone(),
            country_code: self.country_code.clone(),
        }
    }
}

/// Parse a coordinate flag; NaN and infinities are rejected
fn parse_coordinate(raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("'{raw}': {e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{raw}' is not a finite number"))
    }
}

/// Catalog output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaFormat {
    /// Athena `CREATE EXTERNAL TABLE` statement
    Ddl,
    /// Glue-style table input (JSON)
    Json,
    /// One line per column
    Columns,
}
