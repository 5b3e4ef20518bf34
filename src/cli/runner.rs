//! CLI runner - executes commands

use crate::catalog::{TableDefinition, PARTITION_KEYS, WEATHER_COLUMNS};
use crate::cli::commands::{Cli, Commands, LocationArgs, SchemaFormat};
use crate::cli::schedule::{run_schedule, shutdown_signal};
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::ingest::Ingestor;
use crate::normalize::normalize;
use crate::output::CloudDestination;
use crate::partition::StorageKey;
use crate::transform::TransformJob;
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Ingest {
                location,
                event_json,
                bucket,
            } => {
                self.ingest(location, event_json.as_deref(), bucket.as_deref())
                    .await
            }
            Commands::Normalize {
                input,
                location,
                timestamp,
            } => self.normalize(input, location, timestamp.as_deref()),
            Commands::Key {
                city,
                country_code,
                timestamp,
            } => Self::key(city, country_code, timestamp.as_deref()),
            Commands::Schema {
                format,
                database,
                table,
                location,
            } => self.schema(*format, database, table, location.as_deref()),
            Commands::Transform {
                source,
                output,
                prefix,
            } => Self::transform(source, output, prefix.as_deref()).await,
            Commands::Schedule {
                interval_secs,
                max_runs,
            } => self.schedule(*interval_secs, *max_runs).await,
            Commands::Serve { port } => {
                let ingestor = Arc::new(Ingestor::new(self.load_config()?)?);
                crate::cli::serve(ingestor, *port).await
            }
        }
    }

    /// Load configuration: optional YAML file, then environment overrides
    fn load_config(&self) -> Result<IngestConfig> {
        let env = |key: &str| std::env::var(key).ok();
        match &self.cli.config {
            Some(path) => IngestConfig::from_yaml_file(path)?.merge_lookup(env),
            None => IngestConfig::from_env(),
        }
    }

    /// Run one invocation and print its result
    async fn ingest(
        &self,
        location: &LocationArgs,
        event_json: Option<&str>,
        bucket: Option<&str>,
    ) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(bucket) = bucket {
            config = config.with_bucket(bucket);
        }
        let ingestor = Ingestor::new(config)?;

        let event = match event_json {
            Some(raw) => serde_json::from_str(raw)?,
            None => json!({}),
        };
        let event = with_location_args(event, location);

        let start = Instant::now();
        let result = ingestor.invoke(&event).await;
        if self.cli.verbose {
            eprintln!("Invocation took {:?}", start.elapsed());
        }

        println!("{}", serde_json::to_string_pretty(&result)?);

        if result.is_success() {
            Ok(())
        } else {
            Err(Error::Other(format!(
                "Invocation failed with status {}",
                result.status_code
            )))
        }
    }

    /// Normalize a saved response file
    fn normalize(
        &self,
        input: &Path,
        location: &LocationArgs,
        timestamp: Option<&str>,
    ) -> Result<()> {
        let config = self.load_config()?;
        let location = location.overrides().apply(&config.location);

        let content = fs::read_to_string(input).map_err(|e| {
            Error::config(format!("Failed to read response file {}: {e}", input.display()))
        })?;
        let response: JsonValue = serde_json::from_str(&content)?;

        let captured_at = parse_timestamp(timestamp)?.unwrap_or_else(Utc::now);
        let record = normalize(&response, &location, captured_at)?;

        println!("{}", serde_json::to_string_pretty(&record)?);
        Ok(())
    }

    /// Print a storage key
    fn key(city: &str, country_code: &str, timestamp: Option<&str>) -> Result<()> {
        let key = StorageKey::derive(city, country_code, parse_timestamp(timestamp)?);
        println!("{key}");
        Ok(())
    }

    /// Print the catalog table definition
    fn schema(
        &self,
        format: SchemaFormat,
        database: &str,
        table: &str,
        location: Option<&str>,
    ) -> Result<()> {
        match format {
            SchemaFormat::Columns => {
                for column in WEATHER_COLUMNS {
                    println!("{}\t{}", column.name, column.data_type.as_str());
                }
                for column in PARTITION_KEYS {
                    println!("{}\t{}\t(partition)", column.name, column.data_type.as_str());
                }
            }
            SchemaFormat::Ddl | SchemaFormat::Json => {
                let location = match location {
                    Some(location) => location.to_string(),
                    None => self.load_config()?.destination_url().map_err(|_| {
                        Error::config("No table location: pass --location or set S3_BUCKET")
                    })?,
                };
                let definition = TableDefinition::new(database, table, location);

                if format == SchemaFormat::Ddl {
                    println!("{}", definition.create_table_ddl());
                    println!();
                    println!("-- Example query:");
                    println!("-- {}", definition.example_query());
                } else {
                    println!("{}", serde_json::to_string_pretty(&definition)?);
                }
            }
        }
        Ok(())
    }

    /// Transform ingested objects between two destinations
    async fn transform(source: &str, output: &str, prefix: Option<&str>) -> Result<()> {
        let source = CloudDestination::parse(source)?;
        let output = CloudDestination::parse(output)?;
        let job = TransformJob::new(source, output);
        let stats = job.run(prefix).await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }

    /// Run the fixed-interval trigger
    async fn schedule(&self, interval_secs: u64, max_runs: Option<u64>) -> Result<()> {
        if interval_secs == 0 {
            return Err(Error::invalid_value("interval-secs", "must be greater than zero"));
        }
        let ingestor = Ingestor::new(self.load_config()?)?;

        let stats = run_schedule(
            &ingestor,
            Duration::from_secs(interval_secs),
            max_runs,
            shutdown_signal(),
        )
        .await;

        println!("{}", serde_json::to_string(&stats)?);
        Ok(())
    }
}

/// Parse an optional RFC 3339 timestamp into UTC
fn parse_timestamp(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::invalid_value("timestamp", format!("'{s}': {e}")))
    })
    .transpose()
}

/// Add location flags to an invocation event
///
/// A non-object event is replaced when any flag is given.
fn with_location_args(event: JsonValue, location: &LocationArgs) -> JsonValue {
    let overrides = location.overrides();
    if overrides.is_empty() {
        return event;
    }

    let mut object = match event {
        JsonValue::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    if let Some(latitude) = overrides.latitude {
        object.insert("latitude".to_string(), json!(latitude));
    }
    if let Some(longitude) = overrides.longitude {
        object.insert("longitude".to_string(), json!(longitude));
    }
    if let Some(city) = overrides.city {
        object.insert("city".to_string(), json!(city));
    }
    if let Some(country_code) = overrides.country_code {
        object.insert("country_code".to_string(), json!(country_code));
    }
    JsonValue::Object(object)
}
