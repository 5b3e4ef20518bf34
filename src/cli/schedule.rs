//! In-process fixed-interval trigger

use crate::ingest::Ingestor;
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Counters reported when a schedule stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStats {
    /// Invocations that returned 200
    pub succeeded: u64,
    /// Invocations that returned 500
    pub failed: u64,
}

impl ScheduleStats {
    /// Total invocations
    pub fn runs(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// Invoke the ingestor every `interval` until `shutdown` resolves or
/// `max_runs` invocations have completed
///
/// The first invocation fires immediately. Invocations never overlap; a tick
/// missed while one is running is skipped.
pub async fn run_schedule(
    ingestor: &Ingestor,
    interval: Duration,
    max_runs: Option<u64>,
    shutdown: impl Future<Output = ()>,
) -> ScheduleStats {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut stats = ScheduleStats::default();
    let event = json!({});

    loop {
        if max_runs.is_some_and(|max| stats.runs() >= max) {
            break;
        }

        tokio::select! {
            biased;
            () = &mut shutdown => {
                info!("Schedule stopping");
                break;
            }
            _ = ticker.tick() => {
                let result = ingestor.invoke(&event).await;
                if result.is_success() {
                    stats.succeeded += 1;
                } else {
                    stats.failed += 1;
                    warn!("Scheduled invocation failed: {}", result.body);
                }
            }
        }
    }

    info!(
        "Schedule finished after {} runs ({} failed)",
        stats.runs(),
        stats.failed
    );
    stats
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestConfig;
    use crate::output::CloudDestination;
    use object_store::memory::InMemory;
    use std::sync::Arc;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_schedule_stops_after_max_runs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {}})))
            .expect(3)
            .mount(&server)
            .await;

        let config =
            IngestConfig::default().with_weather_api_url(format!("{}/v1/forecast", server.uri()));
        let destination =
            CloudDestination::from_store(Arc::new(InMemory::new()), "s3", "bucket", "");
        let ingestor = Ingestor::new(config).unwrap().with_destination(destination);

        let stats = run_schedule(
            &ingestor,
            Duration::from_millis(5),
            Some(3),
            std::future::pending(),
        )
        .await;

        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn test_schedule_counts_failures() {
        // No bucket configured: every invocation fails without a fetch
        let ingestor = Ingestor::new(IngestConfig::default()).unwrap();

        let stats = run_schedule(
            &ingestor,
            Duration::from_millis(5),
            Some(2),
            std::future::pending(),
        )
        .await;

        assert_eq!(stats, ScheduleStats { succeeded: 0, failed: 2 });
    }

    #[tokio::test]
    async fn test_schedule_stops_on_shutdown() {
        let ingestor = Ingestor::new(IngestConfig::default()).unwrap();

        let stats = run_schedule(&ingestor, Duration::from_secs(3600), None, async {}).await;

        assert_eq!(stats.runs(), 0);
    }
}
