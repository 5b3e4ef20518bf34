//! Schema normalizer module
//!
//! Maps a raw Open-Meteo response onto the fixed `WeatherRecord` shape.
//!
//! # Overview
//!
//! - `normalize` - Build one record from a response and location metadata
//! - `describe_code` - WMO code to human-readable description
//! - `WeatherCategory` - Coarse category derived from the code space

mod codes;
mod normalizer;

pub use codes::{describe_code, WeatherCategory, UNKNOWN_DESCRIPTION, WMO_DESCRIPTIONS};
pub use normalizer::normalize;
