use crate::region_data::error::RegionDataError;
use crate::regions::error::DiscoveryError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarstatError {
    #[error(transparent)]
    RegionData(#[from] RegionDataError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    // Nothing to show, as opposed to corrupt data (`RegionData`).
    #[error("No valid region data found for {requested:?}")]
    EmptySelection { requested: Vec<String> },

    #[error("No regions selected")]
    NoRegionsSelected,

    #[error("Top N must be a positive integer, got {0}")]
    InvalidTopN(usize),

    #[error("Unknown metric '{0}', expected one of GHI, DNI, DHI")]
    UnknownMetric(String),

    #[error("Required column '{0}' not found in frame")]
    MissingColumn(String),

    #[error("Failed to export frame as CSV")]
    Export(#[source] PolarsError),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}
