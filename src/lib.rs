pub mod aggregation;
mod error;
pub mod export;
mod region_data;
mod regions;
mod solarstat;
mod types;
mod utils;

#[cfg(test)]
mod test_utils;

pub use error::SolarstatError;
pub use solarstat::*;

pub use export::{to_csv_bytes, EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
pub use utils::DATA_DIR_ENV;

pub use aggregation::sampling::DistributionSample;
pub use region_data::combiner::{Combination, DatasetCombiner};
pub use region_data::data_loader::{parse_timestamp, RegionLoader};
pub use region_data::frame_cache::{FrameCache, RegionSet};
pub use regions::region_catalog::{region_file_name, RegionCatalog, REGION_FILE_SUFFIX};

pub use types::aggregate::{AggregateRow, RegionMean};
pub use types::grouping::GroupingKey;
pub use types::measurement::MeasurementRow;
pub use types::metric::Metric;
pub use types::unified_frame::{FrameSummary, UnifiedFrame};

pub use region_data::error::RegionDataError;
pub use regions::error::DiscoveryError;
