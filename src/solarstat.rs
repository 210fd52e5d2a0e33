//! This module provides the main entry point of the crate: a client that discovers
//! region datasets in a data directory, combines a selection of them into a
//! [`UnifiedFrame`] and memoises combinations for a limited time.

use crate::aggregation::sampling::DistributionSample;
use crate::error::SolarstatError;
use crate::region_data::combiner::{Combination, DatasetCombiner};
use crate::region_data::frame_cache::{FrameCache, RegionSet};
use crate::regions::error::DiscoveryError;
use crate::regions::region_catalog::RegionCatalog;
use crate::types::grouping::GroupingKey;
use crate::types::metric::Metric;
use crate::types::unified_frame::UnifiedFrame;
use crate::utils::{resolve_data_dir, DEFAULT_DATA_DIR};
use bon::{bon, Builder};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a combined frame is reused before the region files are read again.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);
/// Seed used by [`UnifiedFrame::distribution_sample`] when none is given.
pub const DEFAULT_SAMPLE_SEED: u64 = 1;

/// Settings for a [`Solarstat`] client.
///
/// # Examples
///
/// ```
/// use solarstat::SolarstatConfig;
/// use std::time::Duration;
///
/// let config = SolarstatConfig::builder()
///     .data_dir("/srv/solar/clean")
///     .cache_ttl(Duration::from_secs(60))
///     .build();
/// assert_eq!(config.sample_seed, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct SolarstatConfig {
    /// Directory holding `<region>_clean.csv` files.
    #[builder(into, default = PathBuf::from(DEFAULT_DATA_DIR))]
    pub data_dir: PathBuf,
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    #[builder(default = DEFAULT_SAMPLE_SEED)]
    pub sample_seed: u64,
}

impl Default for SolarstatConfig {
    fn default() -> Self {
        SolarstatConfig::builder().build()
    }
}

/// The main client for loading and combining solar irradiance datasets.
///
/// # Examples
///
/// ```no_run
/// # use solarstat::{Metric, Solarstat, SolarstatError};
/// # fn main() -> Result<(), SolarstatError> {
/// let client = Solarstat::with_data_dir("data");
/// let regions = client.list_regions();
///
/// let combined = client.combine().regions(regions).call()?;
/// for row in combined.frame.top_groups(Metric::Ghi, 10)? {
///     println!("{}: {:?}", row.group, row.mean);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Solarstat {
    config: SolarstatConfig,
    catalog: RegionCatalog,
    combiner: DatasetCombiner,
    cache: FrameCache,
}

#[bon]
impl Solarstat {
    /// Creates a client from explicit settings.
    pub fn with_config(config: SolarstatConfig) -> Self {
        Self {
            catalog: RegionCatalog::new(&config.data_dir),
            combiner: DatasetCombiner::new(&config.data_dir),
            cache: FrameCache::new(config.cache_ttl),
            config,
        }
    }

    /// Creates a client reading region files from `data_dir`, with default settings otherwise.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(SolarstatConfig::builder().data_dir(data_dir).build())
    }

    /// Creates a client reading from `./data`.
    pub fn new() -> Self {
        Self::with_config(SolarstatConfig::default())
    }

    /// Creates a client reading from the directory in `SOLARSTAT_DATA_DIR`,
    /// falling back to `./data`.
    pub fn from_env() -> Self {
        Self::with_data_dir(resolve_data_dir())
    }

    pub fn config(&self) -> &SolarstatConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Region keys available in the data directory, sorted. An unreadable
    /// directory is logged and yields an empty list.
    pub fn list_regions(&self) -> Vec<String> {
        self.catalog.list()
    }

    /// Like [`Solarstat::list_regions`], but surfaces the directory error.
    pub fn try_list_regions(&self) -> Result<Vec<String>, DiscoveryError> {
        self.catalog.try_list()
    }

    /// Loads the selected regions into one frame, reusing a cached result for the
    /// same set of regions while it is younger than the configured TTL.
    ///
    /// Cache entries are keyed by the set of regions regardless of the order they
    /// were requested in. A cached combination is restacked into the requested
    /// order, so the result always matches an uncached combine of the same keys.
    ///
    /// * `.regions(impl IntoIterator<Item = impl Into<String>>)`: **Required.**
    ///
    /// # Errors
    ///
    /// See [`DatasetCombiner::combine`]. Errors are never cached.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use solarstat::{Solarstat, SolarstatError};
    /// # fn main() -> Result<(), SolarstatError> {
    /// let client = Solarstat::new();
    /// let combined = client.combine().regions(["benin", "togo"]).call()?;
    /// for missing in &combined.missing_regions {
    ///     eprintln!("Data not found for {missing}");
    /// }
    /// println!("{} records", combined.frame.height());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn combine<I, S>(&self, regions: I) -> Result<Combination, SolarstatError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let requested: Vec<String> = regions.into_iter().map(Into::into).collect();
        let key = RegionSet::new(requested.iter().cloned());
        if key.is_empty() {
            return Err(SolarstatError::NoRegionsSelected);
        }
        self.cache
            .get_or_try_insert_with(&key, || self.combiner.combine(&key.to_vec()))?
            .in_order(&requested)
    }

    /// Loads the regions in the given order, bypassing the cache.
    pub fn combine_uncached<S: AsRef<str>>(
        &self,
        regions: &[S],
    ) -> Result<Combination, SolarstatError> {
        self.combiner.combine(regions)
    }

    /// Serialises a frame for download, together with its suggested file name and
    /// MIME type.
    pub fn export(
        &self,
        frame: &UnifiedFrame,
    ) -> Result<(Vec<u8>, &'static str, &'static str), SolarstatError> {
        Ok((
            frame.to_csv_bytes()?,
            crate::export::EXPORT_FILE_NAME,
            crate::export::EXPORT_CONTENT_TYPE,
        ))
    }

    /// Samples `frame` for a distribution plot using the configured seed, so repeated
    /// calls on the same frame return the same rows.
    pub fn distribution_sample(
        &self,
        frame: &UnifiedFrame,
        metric: Metric,
        grouping: GroupingKey,
        sample_n: usize,
    ) -> Result<DistributionSample, SolarstatError> {
        frame
            .distribution_sample()
            .metric(metric)
            .sample_n(sample_n)
            .grouping(grouping)
            .seed(self.config.sample_seed)
            .call()
    }

    /// Drops expired cache entries, returning how many were removed.
    pub fn expire_cache(&self) -> usize {
        self.cache.expire()
    }

    pub fn clear_cache(&self) {
        self.cache.clear()
    }
}

impl Default for Solarstat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{region_csv, write_region_file};
    use tempfile::TempDir;

    fn fixture() -> Result<TempDir, std::io::Error> {
        let dir = TempDir::new()?;
        write_region_file(dir.path(), "togo", &region_csv(&[400.0, 600.0]))?;
        write_region_file(dir.path(), "benin", &region_csv(&[100.0, 300.0, 500.0]))?;
        write_region_file(dir.path(), "sierraleone", &region_csv(&[200.0]))?;
        Ok(dir)
    }

    #[test]
    fn test_config_defaults() {
        let config = SolarstatConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.sample_seed, 1);
    }

    #[test]
    fn test_list_regions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_data_dir(dir.path());

        assert_eq!(client.list_regions(), vec!["benin", "sierraleone", "togo"]);
        Ok(())
    }

    #[test]
    fn test_combine_is_cached_by_region_set() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_data_dir(dir.path());

        let first = client.combine().regions(["togo", "benin"]).call()?;
        // Removing the file proves the second call is served from the cache.
        std::fs::remove_file(dir.path().join("togo_clean.csv"))?;
        let second = client.combine().regions(["benin", "togo"]).call()?;

        assert_eq!(first.frame.height(), 5);
        assert_eq!(second.frame.height(), 5);
        assert_eq!(first.frame.regions()?, vec!["togo", "benin"]);
        assert_eq!(second.frame.regions()?, vec!["benin", "togo"]);
        Ok(())
    }

    #[test]
    fn test_cached_combine_keeps_requested_order() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_data_dir(dir.path());
        let keys = ["togo", "niger", "sierraleone", "benin"];

        client.combine().regions(["benin", "sierraleone", "togo", "niger"]).call()?;
        let cached = client.combine().regions(keys).call()?;
        let uncached = client.combine_uncached(&keys)?;

        assert_eq!(cached, uncached);
        assert_eq!(cached.missing_regions, vec!["niger"]);
        let ghi: Vec<Option<f64>> = cached.frame.rows()?.iter().map(|r| r.ghi).collect();
        assert_eq!(
            ghi,
            vec![Some(400.0), Some(600.0), Some(200.0), Some(100.0), Some(300.0), Some(500.0)]
        );
        Ok(())
    }

    #[test]
    fn test_combine_reloads_after_expiry() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_config(
            SolarstatConfig::builder()
                .data_dir(dir.path())
                .cache_ttl(Duration::ZERO)
                .build(),
        );

        client.combine().regions(["togo"]).call()?;
        std::fs::remove_file(dir.path().join("togo_clean.csv"))?;
        let err = client.combine().regions(["togo"]).call().unwrap_err();

        assert!(matches!(err, SolarstatError::EmptySelection { .. }));
        Ok(())
    }

    #[test]
    fn test_combine_without_regions() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_data_dir(dir.path());
        let none: Vec<String> = vec![];

        let err = client.combine().regions(none).call().unwrap_err();

        assert!(matches!(err, SolarstatError::NoRegionsSelected));
        Ok(())
    }

    #[test]
    fn test_end_to_end_views() -> Result<(), Box<dyn std::error::Error>> {
        let dir = fixture()?;
        let client = Solarstat::with_data_dir(dir.path());

        let combined = client.combine().regions(client.list_regions()).call()?;
        let frame = &combined.frame;

        let ranked = frame.rank_by_mean(Metric::Ghi)?;
        let order: Vec<&str> = ranked.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(order, vec!["togo", "benin", "sierraleone"]);

        let top = frame.top_groups(Metric::Ghi, 3)?;
        let sierraleone = top.iter().find(|r| r.group == "sierraleone").expect("group");
        assert_eq!(sierraleone.std, None);

        let sample = client.distribution_sample(frame, Metric::Dni, GroupingKey::ByRegion, 4)?;
        let again = client.distribution_sample(frame, Metric::Dni, GroupingKey::ByRegion, 4)?;
        assert!(sample.sampled);
        assert_eq!(sample.frame.height(), 4);
        assert_eq!(sample, again);

        let (bytes, name, content_type) = client.export(frame)?;
        assert_eq!(name, "filtered_data.csv");
        assert_eq!(content_type, "text/csv");
        assert_eq!(String::from_utf8(bytes)?.lines().count(), 7);
        Ok(())
    }
}
