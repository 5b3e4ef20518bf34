//! AWS Lambda entrypoint
//!
//! Accepts any JSON event (scheduled events, direct invokes carrying
//! location keys) and answers with the `InvocationResult`.

use crate::config::IngestConfig;
use crate::ingest::{Ingestor, InvocationResult};
use crate::types::JsonValue;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;

/// Lambda handler for one invocation
async fn handle_event(
    event: LambdaEvent<JsonValue>,
    ingestor: Arc<Ingestor>,
) -> Result<InvocationResult, Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!("Request {}: {}", context.request_id, payload);

    Ok(ingestor.invoke(&payload).await)
}

/// Initialise logging for the Lambda environment
///
/// CloudWatch adds its own timestamps and does not render ANSI colours.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();
}

/// Lambda runtime entry point
///
/// Configuration is read once from the environment and shared by every
/// invocation the runtime delivers to this process.
pub async fn run() -> Result<(), Error> {
    let config = IngestConfig::from_env()?;
    let ingestor = Arc::new(Ingestor::new(config)?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<JsonValue>| {
        let ingestor = Arc::clone(&ingestor);
        async move { handle_event(event, ingestor).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_runtime::Context;
    use serde_json::json;

    #[tokio::test]
    async fn test_scheduled_event_without_bucket() {
        let ingestor = Arc::new(Ingestor::new(IngestConfig::default()).unwrap());
        let event = LambdaEvent::new(
            json!({"source": "aws.events", "detail-type": "Scheduled Event"}),
            Context::default(),
        );

        let result = handle_event(event, ingestor).await.unwrap();
        assert_eq!(result.status_code, 500);

        let serialized = serde_json::to_value(&result).unwrap();
        assert_eq!(serialized["statusCode"], 500);
        assert!(serialized["body"]
            .as_str()
            .unwrap()
            .contains("Failed to ingest weather data"));
    }
}
