use crate::error::SolarstatError;
use crate::types::aggregate::RegionMean;
use crate::types::measurement::COL_REGION;
use crate::types::metric::Metric;
use crate::types::unified_frame::UnifiedFrame;
use polars::prelude::*;

/// Groups rows by region and orders the regions by descending mean of `metric`.
///
/// Nulls are ignored when averaging; a region with no non-null value gets a `None`
/// mean and is ranked last. Equal means are ordered by region key, ascending.
pub fn rank_by_mean(
    frame: &UnifiedFrame,
    metric: Metric,
) -> Result<Vec<RegionMean>, SolarstatError> {
    frame.require_column(COL_REGION)?;
    frame.require_column(metric.column_name())?;

    let ranked = frame
        .frame
        .clone()
        .lazy()
        .group_by_stable([col(COL_REGION)])
        .agg([col(metric.column_name())
            .cast(DataType::Float64)
            .mean()
            .alias("mean")])
        .sort_by_exprs(
            [col("mean"), col(COL_REGION)],
            SortMultipleOptions::default()
                .with_order_descending_multi([true, false])
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let regions = ranked.column(COL_REGION)?.str()?;
    let means = ranked.column("mean")?.f64()?;

    Ok(regions
        .into_iter()
        .zip(means)
        .filter_map(|(region, mean)| {
            region.map(|region| RegionMean {
                region: region.to_string(),
                mean,
            })
        })
        .collect())
}
