//! Ingestion module
//!
//! Ties the pipeline together for a single invocation.
//!
//! # Overview
//!
//! ```text
//! event → overrides → fetch → normalize → encode → key → write → InvocationResult
//! ```
//!
//! Each invocation is independent and sequential. A failure at any step ends
//! the invocation with a 500 result and no object written.

mod ingestor;
mod result;

pub use ingestor::Ingestor;
pub use result::{IngestOutcome, InvocationResult, FAILURE_MESSAGE, SUCCESS_MESSAGE};
