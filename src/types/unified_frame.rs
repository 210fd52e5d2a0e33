//! Contains the `UnifiedFrame` structure, the in-memory table produced by combining
//! one or more region datasets.

use crate::aggregation::ranking::rank_by_mean;
use crate::aggregation::sampling::{distribution_sample, DistributionSample};
use crate::aggregation::top_groups::{select_grouping_key, top_groups};
use crate::error::SolarstatError;
use crate::export::to_csv_bytes;
use crate::types::aggregate::{AggregateRow, RegionMean};
use crate::types::grouping::GroupingKey;
use crate::types::measurement::{
    MeasurementRow, COL_COMMENTS, COL_DHI, COL_DNI, COL_GHI, COL_REGION, COL_TIMESTAMP,
};
use crate::types::metric::Metric;
use bon::bon;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Headline figures for a unified frame: how many records it holds, the mean of
/// one metric and the covered time span.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct FrameSummary {
    pub metric: Metric,
    pub records: usize,
    pub mean: Option<f64>,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
}

/// A wrapper around a Polars `DataFrame` holding measurements from one or more regions.
///
/// Every row carries a non-null region key in the `country` column and a parsed
/// `Timestamp` (millisecond precision, no time zone). Metric columns are `Float64`
/// when present. Row positions carry no identity across combinations.
///
/// Instances are normally obtained from [`crate::Solarstat::combine`] or
/// [`crate::DatasetCombiner::combine`]. All methods are read-only and return new
/// values; the wrapped frame is never modified in place.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedFrame {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

#[bon]
impl UnifiedFrame {
    /// Wraps a `DataFrame` assumed to follow the unified schema.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Returns `true` if the frame has a column with this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Applies a Polars predicate and collects the matching rows into a new frame.
    pub fn filter(&self, predicate: Expr) -> Result<UnifiedFrame, SolarstatError> {
        let filtered = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(UnifiedFrame::new(filtered))
    }

    /// Keeps the rows whose `Timestamp` lies within `start..=end`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use solarstat::{Solarstat, SolarstatError};
    /// use chrono::NaiveDate;
    ///
    /// # fn main() -> Result<(), SolarstatError> {
    /// let client = Solarstat::new();
    /// let combined = client.combine().regions(vec!["benin", "togo"]).call()?;
    ///
    /// let start = NaiveDate::from_ymd_opt(2021, 8, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2021, 8, 31).unwrap().and_hms_opt(23, 59, 59).unwrap();
    /// let august = combined.frame.filter_range(start, end)?;
    /// println!("{} rows in August", august.height());
    /// # Ok(())
    /// # }
    /// ```
    pub fn filter_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<UnifiedFrame, SolarstatError> {
        self.require_column(COL_TIMESTAMP)?;
        self.filter(
            col(COL_TIMESTAMP)
                .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                .gt_eq(lit(start))
                .and(
                    col(COL_TIMESTAMP)
                        .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                        .lt_eq(lit(end)),
                ),
        )
    }

    /// Distinct region keys in the order they first appear.
    pub fn regions(&self) -> Result<Vec<String>, SolarstatError> {
        let column = self.require_column(COL_REGION)?;
        let values = column.str()?;
        let mut seen = HashSet::new();
        let mut regions = Vec::new();
        for region in values.into_iter().flatten() {
            if seen.insert(region) {
                regions.push(region.to_string());
            }
        }
        Ok(regions)
    }

    /// Record count, mean of `metric` and the earliest/latest timestamp.
    pub fn summary(&self, metric: Metric) -> Result<FrameSummary, SolarstatError> {
        self.require_column(metric.column_name())?;
        self.require_column(COL_TIMESTAMP)?;

        let stats = self
            .frame
            .clone()
            .lazy()
            .select([
                col(metric.column_name())
                    .cast(DataType::Float64)
                    .mean()
                    .alias("mean"),
                col(COL_TIMESTAMP).min().alias("first"),
                col(COL_TIMESTAMP).max().alias("last"),
            ])
            .collect()?;

        let first = timestamp_values(stats.column("first")?)?;
        let last = timestamp_values(stats.column("last")?)?;

        Ok(FrameSummary {
            metric,
            records: self.height(),
            mean: get_opt_float(stats.column("mean")?, 0),
            first: first.first().copied().flatten(),
            last: last.first().copied().flatten(),
        })
    }

    /// Extracts every row as a [`MeasurementRow`].
    ///
    /// Absent optional columns (a metric or `Comments`) come back as `None`.
    pub fn rows(&self) -> Result<Vec<MeasurementRow>, SolarstatError> {
        let timestamps = timestamp_values(self.require_column(COL_TIMESTAMP)?)?;
        let regions = self.require_column(COL_REGION)?.str()?;
        let ghi = self.optional_floats(COL_GHI)?;
        let dni = self.optional_floats(COL_DNI)?;
        let dhi = self.optional_floats(COL_DHI)?;
        let comments = match self.frame.column(COL_COMMENTS) {
            Ok(column) => Some(column.cast(&DataType::String)?),
            Err(_) => None,
        };
        let comments = comments.as_ref().map(|c| c.str()).transpose()?;

        let mut rows = Vec::with_capacity(self.height());
        for (idx, timestamp) in timestamps.into_iter().enumerate() {
            let timestamp = timestamp.ok_or_else(|| {
                SolarstatError::MissingColumn(format!("{COL_TIMESTAMP} (null at row {idx})"))
            })?;
            rows.push(MeasurementRow {
                timestamp,
                ghi: ghi.as_ref().and_then(|ca| ca.get(idx)),
                dni: dni.as_ref().and_then(|ca| ca.get(idx)),
                dhi: dhi.as_ref().and_then(|ca| ca.get(idx)),
                region: regions.get(idx).unwrap_or_default().to_string(),
                comments: comments.and_then(|ca| ca.get(idx)).map(str::to_string),
            });
        }
        Ok(rows)
    }

    /// Regions ordered by descending mean of `metric`.
    ///
    /// See [`crate::aggregation::ranking::rank_by_mean`].
    pub fn rank_by_mean(&self, metric: Metric) -> Result<Vec<RegionMean>, SolarstatError> {
        rank_by_mean(self, metric)
    }

    /// The column [`UnifiedFrame::top_groups`] would group by.
    pub fn grouping_key(&self) -> GroupingKey {
        select_grouping_key(self)
    }

    /// The `top_n` groups by descending mean of `metric`, with count, median and std.
    ///
    /// See [`crate::aggregation::top_groups::top_groups`].
    pub fn top_groups(
        &self,
        metric: Metric,
        top_n: usize,
    ) -> Result<Vec<AggregateRow>, SolarstatError> {
        top_groups(self, metric, top_n)
    }

    /// Draws a reproducible random subset of at most `sample_n` rows for plotting
    /// the distribution of `metric` per group.
    ///
    /// * `.metric(Metric)`: **Required.**
    /// * `.sample_n(usize)`: **Required.** Upper bound on returned rows; `0` disables sampling.
    /// * `.grouping(GroupingKey)`: Optional. Defaults to [`GroupingKey::ByRegion`].
    /// * `.seed(u64)`: Optional. Defaults to [`crate::DEFAULT_SAMPLE_SEED`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use solarstat::{Metric, Solarstat, SolarstatError};
    /// # fn main() -> Result<(), SolarstatError> {
    /// let client = Solarstat::new();
    /// let combined = client.combine().regions(vec!["benin"]).call()?;
    /// let sample = combined
    ///     .frame
    ///     .distribution_sample()
    ///     .metric(Metric::Ghi)
    ///     .sample_n(5_000)
    ///     .call()?;
    /// assert!(sample.frame.height() <= 5_000);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn distribution_sample(
        &self,
        metric: Metric,
        sample_n: usize,
        grouping: Option<GroupingKey>,
        seed: Option<u64>,
    ) -> Result<DistributionSample, SolarstatError> {
        distribution_sample(
            self,
            metric,
            grouping.unwrap_or(GroupingKey::ByRegion),
            sample_n,
            seed.unwrap_or(crate::DEFAULT_SAMPLE_SEED),
        )
    }

    /// Serialises the frame as comma separated text with a header row.
    ///
    /// See [`crate::export::to_csv_bytes`].
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, SolarstatError> {
        to_csv_bytes(self)
    }

    pub(crate) fn require_column(&self, name: &str) -> Result<&Column, SolarstatError> {
        self.frame
            .column(name)
            .map_err(|_| SolarstatError::MissingColumn(name.to_string()))
    }

    fn optional_floats(&self, name: &str) -> Result<Option<Float64Chunked>, SolarstatError> {
        match self.frame.column(name) {
            Ok(column) => {
                let column = column.cast(&DataType::Float64)?;
                Ok(Some(column.f64()?.clone()))
            }
            Err(_) => Ok(None),
        }
    }
}

/// Extracts an optional float value from a specific row of a Column.
pub(crate) fn get_opt_float(column: &Column, idx: usize) -> Option<f64> {
    column.f64().ok().and_then(|ca| ca.get(idx))
}

/// Reads a datetime column back into `NaiveDateTime` values, whatever its time unit.
pub(crate) fn timestamp_values(column: &Column) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let millis = column
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    Ok(millis
        .i64()?
        .into_iter()
        .map(|ms| ms.and_then(DateTime::from_timestamp_millis).map(|dt| dt.naive_utc()))
        .collect())
}
