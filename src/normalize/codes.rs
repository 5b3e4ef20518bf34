//! WMO weather interpretation codes
//!
//! The description table and the category partition are fixed policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Label used for codes missing from the description table
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// WMO code → description, sorted by code
pub const WMO_DESCRIPTIONS: &[(i32, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Foggy"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Slight rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Slight snow"),
    (73, "Moderate snow"),
    (75, "Heavy snow"),
    (77, "Snow grains"),
    (80, "Slight rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Slight snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with slight hail"),
    (99, "Thunderstorm with heavy hail"),
];

/// Look up the description for a WMO code
pub fn describe_code(code: Option<i32>) -> &'static str {
    code.and_then(|code| {
        WMO_DESCRIPTIONS
            .binary_search_by_key(&code, |(c, _)| *c)
            .ok()
            .map(|idx| WMO_DESCRIPTIONS[idx].1)
    })
    .unwrap_or(UNKNOWN_DESCRIPTION)
}

/// Coarse weather category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCategory {
    Clear,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Other,
}

impl WeatherCategory {
    /// Derive the category for a WMO code.
    ///
    /// Fog (45, 48) and the freezing variants (56, 57, 66, 67) fall into `Other`.
    pub fn from_code(code: Option<i32>) -> Self {
        match code {
            Some(0 | 1) => Self::Clear,
            Some(2 | 3) => Self::Clouds,
            Some(51 | 53 | 55 | 61 | 63 | 65 | 80 | 81 | 82) => Self::Rain,
            Some(71 | 73 | 75 | 77 | 85 | 86) => Self::Snow,
            Some(95 | 96 | 99) => Self::Thunderstorm,
            _ => Self::Other,
        }
    }

    /// Category label as stored in the `weather_main` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
