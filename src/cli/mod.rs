//! CLI module
//!
//! Command-line interface for the ingestion pipeline.
//!
//! # Commands
//!
//! - `ingest` - Run one invocation
//! - `normalize` - Normalize a saved API response
//! - `key` - Derive a storage key
//! - `schema` - Print the catalog table definition
//! - `transform` - Filter ingested objects and add Fahrenheit
//! - `schedule` - Run ingestion on a fixed interval
//! - `serve` - Start HTTP server mode

mod commands;
mod runner;
mod schedule;
mod server;

pub use commands::{Cli, Commands, LocationArgs, SchemaFormat};
pub use runner::Runner;
pub use schedule::{run_schedule, shutdown_signal, ScheduleStats};
pub use server::{router, serve};
