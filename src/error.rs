//! Error types for weather ingestion
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for weather ingestion
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Failed to fetch weather data: {message}")]
    Fetch { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Response Errors
    // ============================================================================
    #[error("Unexpected API response format: {message}")]
    MalformedResponse { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Arrow/Parquet/Storage Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] object_store::Error),

    #[error("Invalid storage key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of errors at the invocation boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration missing or invalid; raised before any network call
    Config,
    /// Network failure, timeout or non-success status from the upstream API
    Fetch,
    /// Upstream response did not have the expected structure
    MalformedResponse,
    /// Encoding or storage write failed
    Output,
    /// Anything else
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fetch failure
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create an invalid storage key error
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_) => ErrorKind::Config,
            Error::Fetch { .. }
            | Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Timeout { .. }
            | Error::InvalidUrl(_) => ErrorKind::Fetch,
            Error::MalformedResponse { .. } | Error::JsonParse(_) => ErrorKind::MalformedResponse,
            Error::Arrow(_)
            | Error::Parquet(_)
            | Error::Output { .. }
            | Error::Storage(_)
            | Error::InvalidKey { .. }
            | Error::Io(_) => ErrorKind::Output,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if this is a fetch failure
    pub fn is_fetch_failure(&self) -> bool {
        self.kind() == ErrorKind::Fetch
    }

    /// Check if this is a malformed response
    pub fn is_malformed_response(&self) -> bool {
        self.kind() == ErrorKind::MalformedResponse
    }
}

/// Result type alias for weather ingestion
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("S3_BUCKET");
        assert_eq!(err.to_string(), "Missing required config field: S3_BUCKET");

        let err = Error::http_status(503, "Service Unavailable");
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");

        let err = Error::fetch("HTTP 503: Service Unavailable");
        assert_eq!(
            err.to_string(),
            "Failed to fetch weather data: HTTP 503: Service Unavailable"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(Error::missing_field("S3_BUCKET").kind(), ErrorKind::Config);
        assert_eq!(Error::invalid_value("LATITUDE", "x").kind(), ErrorKind::Config);
        assert_eq!(Error::http_status(503, "").kind(), ErrorKind::Fetch);
        assert_eq!(Error::Timeout { timeout_ms: 10 }.kind(), ErrorKind::Fetch);
        assert_eq!(Error::fetch("down").kind(), ErrorKind::Fetch);
        assert_eq!(Error::malformed("no current").kind(), ErrorKind::MalformedResponse);
        assert_eq!(Error::output("disk full").kind(), ErrorKind::Output);
        assert_eq!(Error::Other("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_fetch_and_malformed_are_distinct() {
        let fetch = Error::fetch("connection refused");
        assert!(fetch.is_fetch_failure());
        assert!(!fetch.is_malformed_response());

        let malformed = Error::malformed("'current' is not an object");
        assert!(malformed.is_malformed_response());
        assert!(!malformed.is_fetch_failure());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
