//! Storage key derivation and parsing

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::Serialize;
use std::fmt;

/// File extension of the columnar encoder's output
pub const PARQUET_EXTENSION: &str = "parquet";

/// Partition columns in path order
pub const PARTITION_COLUMNS: [&str; 4] = ["year", "month", "day", "hour"];

/// Widths of the zero-padded partition values, matching `PARTITION_COLUMNS`
const PARTITION_WIDTHS: [usize; 4] = [4, 2, 2, 2];

/// Lowercase the city and replace spaces with underscores.
///
/// Other punctuation is kept as-is: `"St. John's"` becomes `"st._john's"`.
pub fn city_slug(city: &str) -> String {
    city.to_lowercase().replace(' ', "_")
}

/// The `year=/month=/day=/hour=` prefix of a key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PartitionPath {
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
}

impl PartitionPath {
    /// Partition values from the UTC calendar fields of a timestamp
    pub fn from_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self {
            year: format!("{:04}", timestamp.year()),
            month: format!("{:02}", timestamp.month()),
            day: format!("{:02}", timestamp.day()),
            hour: format!("{:02}", timestamp.hour()),
        }
    }

    /// `(column, value)` pairs in path order
    pub fn values(&self) -> [(&'static str, &str); 4] {
        [
            (PARTITION_COLUMNS[0], self.year.as_str()),
            (PARTITION_COLUMNS[1], self.month.as_str()),
            (PARTITION_COLUMNS[2], self.day.as_str()),
            (PARTITION_COLUMNS[3], self.hour.as_str()),
        ]
    }
}

impl fmt::Display for PartitionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "year={}/month={}/day={}/hour={}",
            self.year, self.month, self.day, self.hour
        )
    }
}

/// Location of one encoded object within storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    key: String,
    partition: PartitionPath,
}

impl StorageKey {
    /// Derive the key for a Parquet object.
    ///
    /// Uses the current UTC time when `timestamp` is `None`; with an explicit
    /// timestamp the result depends only on the arguments.
    pub fn derive(city: &str, country_code: &str, timestamp: Option<DateTime<Utc>>) -> Self {
        Self::derive_with_extension(city, country_code, timestamp, PARQUET_EXTENSION)
    }

    /// Derive a key with a custom file extension
    pub fn derive_with_extension(
        city: &str,
        country_code: &str,
        timestamp: Option<DateTime<Utc>>,
        extension: &str,
    ) -> Self {
        let timestamp = timestamp.unwrap_or_else(Utc::now);
        let partition = PartitionPath::from_timestamp(&timestamp);
        let filename = format!(
            "{}_{}_{}.{extension}",
            city_slug(city),
            country_code.to_lowercase(),
            timestamp.format("%Y%m%d_%H%M%S")
        );

        Self {
            key: format!("{partition}/{filename}"),
            partition,
        }
    }

    /// Parse an existing key, recovering its partition values.
    ///
    /// The key must start with the four partition segments followed by a
    /// file name.
    pub fn parse(key: &str) -> Result<Self> {
        let segments: Vec<&str> = key.split('/').collect();
        if segments.len() != PARTITION_COLUMNS.len() + 1 {
            return Err(Error::invalid_key(key, "expected year=/month=/day=/hour=/<file>"));
        }

        let mut values: Vec<String> = Vec::with_capacity(PARTITION_COLUMNS.len());
        for ((segment, column), width) in segments
            .iter()
            .zip(PARTITION_COLUMNS)
            .zip(PARTITION_WIDTHS)
        {
            let value = segment
                .strip_prefix(column)
                .and_then(|rest| rest.strip_prefix('='))
                .ok_or_else(|| {
                    Error::invalid_key(key, format!("missing '{column}=' segment"))
                })?;

            if value.len() != width || !value.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_key(
                    key,
                    format!("'{column}' must be {width} digits, got '{value}'"),
                ));
            }
            values.push(value.to_string());
        }

        if segments[PARTITION_COLUMNS.len()].is_empty() {
            return Err(Error::invalid_key(key, "missing file name"));
        }

        let [year, month, day, hour]: [String; 4] = values
            .try_into()
            .map_err(|_| Error::invalid_key(key, "incomplete partition prefix"))?;

        Ok(Self {
            key: key.to_string(),
            partition: PartitionPath {
                year,
                month,
                day,
                hour,
            },
        })
    }

    /// The full key string
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Consume into the key string
    pub fn into_string(self) -> String {
        self.key
    }

    /// The partition prefix of this key
    pub fn partition(&self) -> &PartitionPath {
        &self.partition
    }

    /// Partition column names paired with this key's values
    pub fn partition_values(&self) -> [(&'static str, &str); 4] {
        self.partition.values()
    }

    /// The file name after the last `/`
    pub fn file_name(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
