use crate::types::grouping::GroupingKey;
use serde::Serialize;

/// A region and the mean of a metric over all its rows.
///
/// `mean` is `None` when every value of the metric in the region is null.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct RegionMean {
    pub region: String,
    pub mean: Option<f64>,
}

/// One row of a grouped statistics view.
///
/// `count` only counts non-null metric values. `std` is the sample standard
/// deviation (n - 1 denominator) and is `None` for groups with fewer than two
/// values, where it is undefined.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct AggregateRow {
    pub grouping: GroupingKey,
    pub group: String,
    pub count: u64,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
}
