use crate::region_data::error::RegionDataError;
use crate::regions::region_catalog::region_file_name;
use crate::types::measurement::{
    COL_COMMENTS, COL_DHI, COL_DNI, COL_GHI, COL_REGION, COL_TIMESTAMP,
};
use crate::types::unified_frame::{timestamp_values, UnifiedFrame};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use polars::prelude::*;
use std::path::{Path, PathBuf};

const METRIC_COLUMNS: [&str; 3] = [COL_GHI, COL_DNI, COL_DHI];

/// Field values read as missing, in addition to empty fields. Matches the missing-value
/// tokens pandas writes and reads by default.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// Tried in order; `%.f` also accepts a missing fractional part.
const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parses a Timestamp field. Offsets (RFC 3339) are converted to UTC, bare dates
/// map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Reads one region's dataset from the data directory.
#[derive(Debug, Clone)]
pub struct RegionLoader {
    data_dir: PathBuf,
}

impl RegionLoader {
    pub fn new(data_dir: &Path) -> RegionLoader {
        RegionLoader {
            data_dir: data_dir.to_path_buf(),
        }
    }

    /// Loads region `key` as a normalised frame.
    ///
    /// # Errors
    ///
    /// [`RegionDataError::NotFound`] when `<key>_clean.csv` does not exist; every
    /// other variant means the file exists but could not be turned into rows.
    pub fn load(&self, key: &str) -> Result<UnifiedFrame, RegionDataError> {
        validate_region_key(key)?;
        let path = self.data_dir.join(region_file_name(key));
        if !path.exists() {
            return Err(RegionDataError::NotFound {
                region: key.to_string(),
                path,
            });
        }

        let null_values = NULL_TOKENS.iter().map(|token| (*token).into()).collect();
        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .with_parse_options(
                CsvParseOptions::default()
                    .with_null_values(Some(NullValues::AllColumns(null_values))),
            )
            .try_into_reader_with_file_path(Some(path.clone()))
            .map_err(|e| RegionDataError::CsvRead {
                region: key.to_string(),
                path: path.clone(),
                source: e,
            })?
            .finish()
            .map_err(|e| RegionDataError::CsvRead {
                region: key.to_string(),
                path: path.clone(),
                source: e,
            })?;

        let frame = normalize_frame(raw, key)?;
        debug!(
            "Loaded {} rows for region {} from {}",
            frame.height(),
            key,
            path.display()
        );
        Ok(frame)
    }
}

fn validate_region_key(key: &str) -> Result<(), RegionDataError> {
    let invalid = key.trim().is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\']);
    if invalid {
        return Err(RegionDataError::InvalidRegionKey(key.to_string()));
    }
    Ok(())
}

/// Brings a freshly parsed region frame to the unified schema.
///
/// * `Timestamp` is required and becomes a millisecond datetime column.
/// * `GHI`, `DNI` and `DHI` become `Float64` when present, with NaN read as null.
/// * `Comments` becomes a string column when present.
/// * `country` is added with `key` on every row when absent; when present,
///   null entries are filled with `key`.
///
/// Columns are never dropped, so extra measurements survive into exports.
pub fn normalize_frame(raw: DataFrame, key: &str) -> Result<UnifiedFrame, RegionDataError> {
    let column_op = |source: PolarsError| RegionDataError::ColumnOperation {
        region: key.to_string(),
        source,
    };

    let timestamp = raw
        .column(COL_TIMESTAMP)
        .map_err(|_| RegionDataError::MissingColumn {
            region: key.to_string(),
            column: COL_TIMESTAMP.to_string(),
        })?;
    let timestamp = parse_timestamp_column(timestamp, key)?;

    let mut casts = Vec::new();
    for metric in METRIC_COLUMNS {
        if raw.get_column_index(metric).is_some() {
            casts.push(
                col(metric)
                    .strict_cast(DataType::Float64)
                    .fill_nan(lit(NULL)),
            );
        }
    }
    if raw.get_column_index(COL_COMMENTS).is_some() {
        casts.push(col(COL_COMMENTS).cast(DataType::String));
    }
    if raw.get_column_index(COL_REGION).is_some() {
        casts.push(
            col(COL_REGION)
                .cast(DataType::String)
                .fill_null(lit(key.to_string())),
        );
    } else {
        casts.push(lit(key.to_string()).alias(COL_REGION));
    }

    let mut frame = raw.lazy().with_columns(casts).collect().map_err(column_op)?;
    frame.with_column(timestamp).map_err(column_op)?;
    Ok(UnifiedFrame::new(frame))
}

fn parse_timestamp_column(column: &Column, key: &str) -> Result<Series, RegionDataError> {
    let column_op = |source: PolarsError| RegionDataError::ColumnOperation {
        region: key.to_string(),
        source,
    };
    let null_at = |row: usize| RegionDataError::NullTimestamp {
        region: key.to_string(),
        row,
    };

    let mut millis = Vec::with_capacity(column.len());
    if matches!(column.dtype(), DataType::Datetime(_, _) | DataType::Date) {
        for (row, value) in timestamp_values(column)
            .map_err(column_op)?
            .into_iter()
            .enumerate()
        {
            let value = value.ok_or_else(|| null_at(row))?;
            millis.push(value.and_utc().timestamp_millis());
        }
    } else {
        let strings = column.cast(&DataType::String).map_err(column_op)?;
        let values = strings.str().map_err(column_op)?;
        for (row, value) in values.into_iter().enumerate() {
            let value = value.ok_or_else(|| null_at(row))?;
            let parsed = parse_timestamp(value).ok_or_else(|| RegionDataError::TimestampParse {
                region: key.to_string(),
                row,
                value: value.to_string(),
            })?;
            millis.push(parsed.and_utc().timestamp_millis());
        }
    }

    Series::new(COL_TIMESTAMP.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map_err(column_op)
}
