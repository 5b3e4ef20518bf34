//! One fetch → normalize → encode → key → write cycle

use super::result::{IngestOutcome, InvocationResult};
use crate::config::{validate_location, IngestConfig, InvocationOverrides, ENV_BUCKET};
use crate::error::{Error, Result};
use crate::http::OpenMeteoClient;
use crate::normalize::normalize;
use crate::output::{encode_parquet, records_to_batch, CloudDestination, ParquetWriterConfig};
use crate::partition::StorageKey;
use crate::types::JsonValue;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs ingestion invocations against a shared, read-only configuration
#[derive(Debug, Clone)]
pub struct Ingestor {
    config: Arc<IngestConfig>,
    client: OpenMeteoClient,
    destination: Option<CloudDestination>,
    parquet: ParquetWriterConfig,
}

impl Ingestor {
    /// Build an ingestor from a validated config
    ///
    /// When no bucket is configured the ingestor is still built; every
    /// invocation then fails with a configuration error before any fetch.
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;

        let client = OpenMeteoClient::new(&config.weather_api_url, config.request_timeout())?;
        let destination = match config.destination_url() {
            Ok(url) => Some(CloudDestination::parse(&url)?),
            Err(Error::MissingConfigField { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(Self {
            config: Arc::new(config),
            client,
            destination,
            parquet: ParquetWriterConfig::default(),
        })
    }

    /// Replace the destination
    #[must_use]
    pub fn with_destination(mut self, destination: CloudDestination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Replace the Parquet writer settings
    #[must_use]
    pub fn with_parquet_config(mut self, config: ParquetWriterConfig) -> Self {
        self.parquet = config;
        self
    }

    /// The shared configuration
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// The configured destination, if any
    pub fn destination(&self) -> Option<&CloudDestination> {
        self.destination.as_ref()
    }

    /// Handle one invocation event
    ///
    /// Never fails: every error becomes a 500 result.
    pub async fn invoke(&self, event: &JsonValue) -> InvocationResult {
        match self.invoke_event(event).await {
            Ok(outcome) => {
                info!("Successfully ingested weather data to {}", outcome.location);
                InvocationResult::success(&outcome)
            }
            Err(e) => {
                error!("Error ingesting weather data: {e}");
                InvocationResult::failure(&e)
            }
        }
    }

    async fn invoke_event(&self, event: &JsonValue) -> Result<IngestOutcome> {
        let overrides = InvocationOverrides::from_event(event)?;
        self.run(&overrides).await
    }

    /// Run one ingestion
    ///
    /// The steps run strictly in order and stop at the first failure, so
    /// nothing is written unless every earlier step succeeded.
    pub async fn run(&self, overrides: &InvocationOverrides) -> Result<IngestOutcome> {
        let location = overrides.apply(&self.config.location);
        validate_location(&location)?;

        let destination = self
            .destination
            .as_ref()
            .ok_or_else(|| Error::missing_field(ENV_BUCKET))?;

        let captured_at = Utc::now();

        let response = self
            .client
            .fetch_current(location.latitude, location.longitude)
            .await?;

        let record = normalize(&response, &location, captured_at)?;
        debug!(
            "Normalized record: {} {} ({})",
            record.city, record.weather_main, record.weather_description
        );

        let batch = records_to_batch(std::slice::from_ref(&record))?;
        let data = encode_parquet(&batch, Some(&self.parquet))?;
        let bytes_written = data.len();

        let key = StorageKey::derive(&location.city, &location.country_code, Some(captured_at));
        info!("Uploading {} bytes to {}", bytes_written, key);

        let written = destination.write(key.as_str(), data).await?;

        Ok(IngestOutcome {
            record,
            key,
            location: written,
            bytes_written,
        })
    }
}
