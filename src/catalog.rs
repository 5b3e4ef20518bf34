//! Catalog table definition for ingested weather data
//!
//! The column list here is the contract between the normalizer output and
//! the query layer. The Arrow schema used for encoding is derived from it,
//! so records, Parquet files and the catalog table cannot drift apart.

use crate::partition::PartitionPath;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Default catalog database name
pub const DEFAULT_DATABASE: &str = "weather_db";

/// Default catalog table name
pub const DEFAULT_TABLE: &str = "weather_data";

const PARQUET_SERDE: &str = "org.apache.hadoop.hive.ql.io.parquet.serde.ParquetHiveSerDe";
const PARQUET_INPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat";
const PARQUET_OUTPUT_FORMAT: &str =
    "org.apache.hadoop.hive.ql.io.parquet.MapredParquetOutputFormat";

// ============================================================================
// Column Types
// ============================================================================

/// Hive/Glue column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogType {
    Timestamp,
    String,
    Int,
    Bigint,
    Double,
}

impl CatalogType {
    /// Type name as written in DDL
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::String => "string",
            Self::Int => "int",
            Self::Bigint => "bigint",
            Self::Double => "double",
        }
    }

    /// Arrow type used when encoding this column
    pub fn arrow_type(&self) -> DataType {
        match self {
            Self::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            Self::String => DataType::Utf8,
            Self::Int => DataType::Int32,
            Self::Bigint => DataType::Int64,
            Self::Double => DataType::Float64,
        }
    }
}

/// A catalog column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Column {
    pub name: &'static str,
    #[serde(rename = "Type")]
    pub data_type: CatalogType,
    pub comment: &'static str,
}

const fn column(name: &'static str, data_type: CatalogType, comment: &'static str) -> Column {
    Column {
        name,
        data_type,
        comment,
    }
}

/// Data columns, in `WeatherRecord` field order
pub const WEATHER_COLUMNS: &[Column] = &[
    column("timestamp", CatalogType::Timestamp, "Data collection timestamp"),
    column("city", CatalogType::String, "City name"),
    column("country_code", CatalogType::String, "Country code"),
    column("weather_id", CatalogType::Int, "Weather condition ID"),
    column("weather_main", CatalogType::String, "Weather main condition"),
    column("weather_description", CatalogType::String, "Weather description"),
    column("temperature", CatalogType::Double, "Temperature in Celsius"),
    column("feels_like", CatalogType::Double, "Feels like temperature"),
    column("temp_min", CatalogType::Double, "Minimum temperature"),
    column("temp_max", CatalogType::Double, "Maximum temperature"),
    column("pressure", CatalogType::Int, "Atmospheric pressure"),
    column("humidity", CatalogType::Int, "Humidity percentage"),
    column("visibility", CatalogType::Int, "Visibility in kilometers"),
    column("wind_speed", CatalogType::Double, "Wind speed"),
    column("wind_deg", CatalogType::Int, "Wind direction in degrees"),
    column("clouds", CatalogType::Int, "Cloud coverage percentage"),
    column("sunrise", CatalogType::Bigint, "Sunrise timestamp"),
    column("sunset", CatalogType::Bigint, "Sunset timestamp"),
    column("timezone", CatalogType::String, "Timezone"),
    column("latitude", CatalogType::Double, "Latitude"),
    column("longitude", CatalogType::Double, "Longitude"),
];

/// Partition columns, derived from the storage key
pub const PARTITION_KEYS: &[Column] = &[
    column("year", CatalogType::String, "Year partition"),
    column("month", CatalogType::String, "Month partition"),
    column("day", CatalogType::String, "Day partition"),
    column("hour", CatalogType::String, "Hour partition"),
];

/// Arrow schema for encoded weather records.
///
/// Every column is nullable; the catalog has no NOT NULL constraints.
pub fn arrow_schema() -> SchemaRef {
    let fields: Vec<Field> = WEATHER_COLUMNS
        .iter()
        .map(|c| Field::new(c.name, c.data_type.arrow_type(), true))
        .collect();
    Arc::new(Schema::new(fields))
}

// ============================================================================
// Table Definition
// ============================================================================

/// SerDe settings of the storage descriptor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SerdeInfo {
    pub serialization_library: String,
    pub parameters: BTreeMap<String, String>,
}

/// Physical layout of the table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageDescriptor {
    pub columns: Vec<Column>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub serde_info: SerdeInfo,
    pub compressed: bool,
    pub stored_as_sub_directories: bool,
}

/// External table over the ingested Parquet objects.
///
/// Serializes to the shape of a Glue `TableInput`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableDefinition {
    #[serde(skip)]
    pub database: String,
    pub name: String,
    pub description: String,
    pub table_type: String,
    pub parameters: BTreeMap<String, String>,
    pub storage_descriptor: StorageDescriptor,
    pub partition_keys: Vec<Column>,
}

impl TableDefinition {
    /// Build the table definition for data stored under `location`
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let mut location = location.into();
        if !location.ends_with('/') {
            location.push('/');
        }

        let parameters = BTreeMap::from([
            ("classification".to_string(), "parquet".to_string()),
            ("typeOfData".to_string(), "file".to_string()),
        ]);

        Self {
            database: database.into(),
            name: table.into(),
            description: "Weather data table with Parquet format".to_string(),
            table_type: "EXTERNAL_TABLE".to_string(),
            parameters,
            storage_descriptor: StorageDescriptor {
                columns: WEATHER_COLUMNS.to_vec(),
                location,
                input_format: PARQUET_INPUT_FORMAT.to_string(),
                output_format: PARQUET_OUTPUT_FORMAT.to_string(),
                serde_info: SerdeInfo {
                    serialization_library: PARQUET_SERDE.to_string(),
                    parameters: BTreeMap::from([(
                        "serialization.format".to_string(),
                        "1".to_string(),
                    )]),
                },
                compressed: false,
                stored_as_sub_directories: true,
            },
            partition_keys: PARTITION_KEYS.to_vec(),
        }
    }

    /// Fully qualified `database.table` name
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }

    /// Athena `CREATE EXTERNAL TABLE` statement
    pub fn create_table_ddl(&self) -> String {
        let mut ddl = format!(
            "CREATE EXTERNAL TABLE IF NOT EXISTS `{}`.`{}` (\n",
            self.database, self.name
        );
        write_column_list(&mut ddl, &self.storage_descriptor.columns);
        ddl.push_str(")\nPARTITIONED BY (\n");
        write_column_list(&mut ddl, &self.partition_keys);
        let _ = write!(
            ddl,
            ")\nSTORED AS PARQUET\nLOCATION '{}'\nTBLPROPERTIES ('classification'='parquet');",
            self.storage_descriptor.location
        );
        ddl
    }

    /// Register one hour partition (there is no crawler)
    pub fn add_partition_sql(&self, partition: &PartitionPath) -> String {
        let spec = partition
            .values()
            .iter()
            .map(|(column, value)| format!("{column}='{value}'"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "ALTER TABLE {} ADD IF NOT EXISTS PARTITION ({spec}) LOCATION '{}{partition}/';",
            self.qualified_name(),
            self.storage_descriptor.location
        )
    }

    /// Example query against the table
    pub fn example_query(&self) -> String {
        format!("SELECT * FROM {} LIMIT 10", self.qualified_name())
    }
}

fn write_column_list(out: &mut String, columns: &[Column]) {
    let last = columns.len().saturating_sub(1);
    for (idx, c) in columns.iter().enumerate() {
        let separator = if idx == last { "" } else { "," };
        let _ = writeln!(
            out,
            "  `{}` {} COMMENT '{}'{separator}",
            c.name,
            c.data_type.as_str(),
            c.comment
        );
    }
}
