use crate::error::SolarstatError;
use crate::types::aggregate::AggregateRow;
use crate::types::grouping::GroupingKey;
use crate::types::measurement::COL_COMMENTS;
use crate::types::metric::Metric;
use crate::types::unified_frame::UnifiedFrame;
use polars::prelude::*;

const COL_GROUP: &str = "group";
const COL_N: &str = "n";
const COL_MEAN: &str = "mean";
const COL_MEDIAN: &str = "median";
const COL_STD: &str = "std";

/// Decides which column grouped statistics are keyed by.
///
/// `Comments` is used when the column exists and holds at least one non-null
/// value; otherwise rows are grouped by region.
pub fn select_grouping_key(frame: &UnifiedFrame) -> GroupingKey {
    match frame.frame.column(COL_COMMENTS) {
        Ok(comments) if comments.null_count() < comments.len() => GroupingKey::ByComments,
        _ => GroupingKey::ByRegion,
    }
}

/// Count, mean, median and sample standard deviation of `metric` per group, for
/// the `top_n` groups with the highest mean.
///
/// The grouping column is chosen once by [`select_grouping_key`]. Rows with a null
/// group key are left out. Groups are sorted by descending mean, ties by ascending
/// group key, groups without any metric value last. Asking for more groups than
/// exist returns all of them.
///
/// # Errors
///
/// [`SolarstatError::InvalidTopN`] if `top_n` is zero, and
/// [`SolarstatError::MissingColumn`] if the metric or grouping column is absent.
pub fn top_groups(
    frame: &UnifiedFrame,
    metric: Metric,
    top_n: usize,
) -> Result<Vec<AggregateRow>, SolarstatError> {
    if top_n == 0 {
        return Err(SolarstatError::InvalidTopN(top_n));
    }
    let grouping = select_grouping_key(frame);
    let group_col = grouping.column_name();
    frame.require_column(group_col)?;
    frame.require_column(metric.column_name())?;

    let value = || col(metric.column_name()).cast(DataType::Float64);
    let stats = frame
        .frame
        .clone()
        .lazy()
        .filter(col(group_col).is_not_null())
        .select([
            col(group_col).cast(DataType::String).alias(COL_GROUP),
            value().alias(metric.column_name()),
        ])
        .group_by_stable([col(COL_GROUP)])
        .agg([
            value().count().cast(DataType::UInt64).alias(COL_N),
            value().mean().alias(COL_MEAN),
            value().median().alias(COL_MEDIAN),
            value().std(1).alias(COL_STD),
        ])
        .sort_by_exprs(
            [col(COL_MEAN), col(COL_GROUP)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?
        .head(Some(top_n));

    let groups = stats.column(COL_GROUP)?.str()?;
    let counts = stats.column(COL_N)?.u64()?;
    let means = stats.column(COL_MEAN)?.f64()?;
    let medians = stats.column(COL_MEDIAN)?.f64()?;
    let stds = stats.column(COL_STD)?.f64()?;

    let mut rows = Vec::with_capacity(stats.height());
    for idx in 0..stats.height() {
        let Some(group) = groups.get(idx) else {
            continue;
        };
        let count = counts.get(idx).unwrap_or(0);
        rows.push(AggregateRow {
            grouping,
            group: group.to_string(),
            count,
            mean: means.get(idx),
            median: medians.get(idx),
            // Undefined below two values, whatever the backend reports.
            std: if count < 2 { None } else { stds.get(idx) },
        });
    }
    Ok(rows)
}
