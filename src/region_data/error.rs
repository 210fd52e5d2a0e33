use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionDataError {
    #[error("Data file not found for region '{region}': {path}")]
    NotFound { region: String, path: PathBuf },

    #[error("Invalid region key '{0}'")]
    InvalidRegionKey(String),

    // Errors while reading the delimited text itself
    #[error("Failed to read CSV data for region '{region}' from {path}")]
    CsvRead {
        region: String,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Missing required column '{column}' for region '{region}'")]
    MissingColumn { region: String, column: String },

    #[error("Empty Timestamp in row {row} for region '{region}'")]
    NullTimestamp { region: String, row: usize },

    #[error("Unparseable Timestamp '{value}' in row {row} for region '{region}'")]
    TimestampParse {
        region: String,
        row: usize,
        value: String,
    },

    #[error("Failed Polars column operation for region '{region}': {source}")]
    ColumnOperation {
        region: String,
        #[source]
        source: PolarsError,
    },
}

impl RegionDataError {
    /// `true` for a region whose file is absent, the only failure a combine may skip.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegionDataError::NotFound { .. })
    }
}
