// src/catalog/copy.rs

use super::Table;
use crate::config::DwhConfig;

/// How the warehouse maps JSON fields onto staging columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsonFormat {
    /// Match top-level keys to column names.
    Auto,
    /// Use a JSONPaths file at this object-storage location.
    JsonPaths(String),
}

impl JsonFormat {
    fn as_literal(&self) -> String {
        match self {
            JsonFormat::Auto => quote_literal("auto"),
            JsonFormat::JsonPaths(path) => quote_literal(path),
        }
    }
}

/// Everything baked into one bulk-copy statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopySource {
    pub location: String,
    pub iam_role: String,
    pub format: JsonFormat,
    pub region: String,
}

impl CopySource {
    /// Event logs, read with the configured JSONPaths file if any.
    pub fn events(config: &DwhConfig) -> Self {
        let format = match &config.s3.log_jsonpath {
            Some(path) => JsonFormat::JsonPaths(path.clone()),
            None => JsonFormat::Auto,
        };
        Self {
            location: config.s3.log_data.clone(),
            iam_role: config.iam_role.arn.clone(),
            format,
            region: config.aws.region.clone(),
        }
    }

    /// Song metadata, always read with `auto`.
    pub fn songs(config: &DwhConfig) -> Self {
        Self {
            location: config.s3.song_data.clone(),
            iam_role: config.iam_role.arn.clone(),
            format: JsonFormat::Auto,
            region: config.aws.region.clone(),
        }
    }

    /// Render the `COPY` statement loading into `table`.
    pub fn render(&self, table: Table) -> String {
        format!(
            "
COPY {table} FROM {location}
CREDENTIALS {credentials}
FORMAT AS JSON {format}
REGION {region};",
            table = table.as_str(),
            location = quote_literal(&self.location),
            credentials = quote_literal(&format!("aws_iam_role={}", self.iam_role)),
            format = self.format.as_literal(),
            region = quote_literal(&self.region),
        )
    }
}

/// Single-quote `value` as a SQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
