//! HTTP client module
//!
//! Provides the HTTP client used to call the weather API.
//!
//! # Features
//!
//! - **Fixed Timeout**: Every request is bounded, 10 seconds by default
//! - **Single Attempt**: Failures are returned to the caller, never retried
//! - **Open-Meteo**: Current-conditions request builder and fetcher

mod client;
mod openmeteo;

pub use client::{
    HttpClient, HttpClientConfig, RequestConfig, DEFAULT_TIMEOUT, MAX_ERROR_BODY_BYTES,
};
pub use openmeteo::{OpenMeteoClient, CURRENT_VARIABLES, DEFAULT_WEATHER_API_URL};

#[cfg(test)]
mod tests;
