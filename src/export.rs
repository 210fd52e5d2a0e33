//! Flat CSV snapshot of a unified frame, offered for download by the UI layer.
//!
//! Layout:
//! * delimiter `,`, header row first, no row index column;
//! * fields ordered `Timestamp`, `GHI`, `DNI`, `DHI` (each when present), then any
//!   other source columns in frame order, then `Comments` (when present) and
//!   `country` last;
//! * timestamps written as `%Y-%m-%d %H:%M:%S`, nulls as empty fields.
//!
//! The output loads back through [`crate::RegionLoader`] unchanged apart from
//! float formatting and sub-second timestamp precision.

use crate::error::SolarstatError;
use crate::types::measurement::{
    COL_COMMENTS, COL_DHI, COL_DNI, COL_GHI, COL_REGION, COL_TIMESTAMP,
};
use crate::types::unified_frame::UnifiedFrame;
use polars::prelude::*;

/// Suggested file name for the exported snapshot.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";
/// MIME type of the exported snapshot.
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";
pub const EXPORT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
pub const EXPORT_SEPARATOR: u8 = b',';

const LEADING_COLUMNS: [&str; 4] = [COL_TIMESTAMP, COL_GHI, COL_DNI, COL_DHI];
const TRAILING_COLUMNS: [&str; 2] = [COL_COMMENTS, COL_REGION];

/// The export field order for a frame with these column names.
pub fn export_column_order<'a>(names: &[&'a str]) -> Vec<&'a str> {
    let leading = LEADING_COLUMNS
        .iter()
        .filter_map(|wanted| names.iter().find(|name| *name == wanted).copied());
    let middle = names
        .iter()
        .filter(|name| !LEADING_COLUMNS.contains(name) && !TRAILING_COLUMNS.contains(name))
        .copied();
    let trailing = TRAILING_COLUMNS
        .iter()
        .filter_map(|wanted| names.iter().find(|name| *name == wanted).copied());
    leading.chain(middle).chain(trailing).collect()
}

/// Serialises `frame` as CSV bytes. Pure: the input frame is not modified.
pub fn to_csv_bytes(frame: &UnifiedFrame) -> Result<Vec<u8>, SolarstatError> {
    let names: Vec<&str> = frame
        .frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    let order: Vec<String> = export_column_order(&names)
        .into_iter()
        .map(str::to_string)
        .collect();
    let mut ordered = frame.frame.select(order).map_err(SolarstatError::Export)?;

    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(EXPORT_SEPARATOR)
        .with_datetime_format(Some(EXPORT_DATETIME_FORMAT.to_string()))
        .finish(&mut ordered)
        .map_err(SolarstatError::Export)?;
    Ok(buffer)
}
