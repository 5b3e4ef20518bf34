//! AWS Lambda binary entry point
//!
//! Build with: cargo build --release --features lambda --bin bootstrap

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    weather_ingest::lambda::init_tracing();
    weather_ingest::lambda::run().await
}
