use crate::error::SolarstatError;
use crate::region_data::data_loader::RegionLoader;
use crate::types::unified_frame::UnifiedFrame;
use log::{info, warn};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// A unified frame together with the requested regions that had no data file.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub frame: UnifiedFrame,
    /// Requested keys that were skipped because their file does not exist,
    /// in request order.
    pub missing_regions: Vec<String>,
    /// Rows contributed by each loaded region, in stacking order.
    pub region_rows: Vec<(String, usize)>,
}

impl Combination {
    /// Restacks the loaded regions in the order of `keys`, keeping rows in file
    /// order within each region. Keys that were neither loaded nor missing are
    /// ignored; repeated keys are taken at their first position.
    pub fn in_order<S: AsRef<str>>(&self, keys: &[S]) -> Result<Combination, SolarstatError> {
        let mut offsets = HashMap::new();
        let mut offset = 0;
        for (region, rows) in &self.region_rows {
            offsets.insert(region.as_str(), (offset, *rows));
            offset += rows;
        }

        let mut seen = HashSet::new();
        let mut parts = Vec::new();
        let mut region_rows = Vec::new();
        let mut missing_regions = Vec::new();
        for key in keys.iter().map(|k| k.as_ref()) {
            if !seen.insert(key) {
                continue;
            }
            if let Some(&(offset, rows)) = offsets.get(key) {
                parts.push(self.frame.frame.slice(offset as i64, rows));
                region_rows.push((key.to_string(), rows));
            } else if self.missing_regions.iter().any(|m| m == key) {
                missing_regions.push(key.to_string());
            }
        }

        let mut parts = parts.into_iter();
        let Some(mut frame) = parts.next() else {
            return Ok(self.clone());
        };
        for part in parts {
            frame.vstack_mut(&part)?;
        }
        Ok(Combination {
            frame: UnifiedFrame::new(frame),
            missing_regions,
            region_rows,
        })
    }
}

/// Loads several regions and concatenates them into one frame.
#[derive(Debug, Clone)]
pub struct DatasetCombiner {
    loader: RegionLoader,
}

impl DatasetCombiner {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            loader: RegionLoader::new(data_dir),
        }
    }

    pub fn loader(&self) -> &RegionLoader {
        &self.loader
    }

    /// Loads every key and stacks the results, regions in the given order and rows
    /// in file order. Repeated keys are loaded once, at their first position.
    ///
    /// A region whose file does not exist is skipped with one warning and listed in
    /// [`Combination::missing_regions`]. Any other load failure aborts the whole
    /// combination. Frames with differing column sets are aligned by name, columns
    /// missing from a region are null for its rows.
    ///
    /// # Errors
    ///
    /// * [`SolarstatError::NoRegionsSelected`] if `keys` is empty.
    /// * [`SolarstatError::RegionData`] for the first region that exists but fails to load.
    /// * [`SolarstatError::EmptySelection`] if no rows were loaded at all.
    pub fn combine<S: AsRef<str>>(&self, keys: &[S]) -> Result<Combination, SolarstatError> {
        if keys.is_empty() {
            return Err(SolarstatError::NoRegionsSelected);
        }

        let mut seen = HashSet::new();
        let mut frames = Vec::new();
        let mut missing_regions = Vec::new();
        let mut region_rows = Vec::new();
        for key in keys.iter().map(|k| k.as_ref()) {
            if !seen.insert(key) {
                continue;
            }
            match self.loader.load(key) {
                Ok(frame) => {
                    region_rows.push((key.to_string(), frame.height()));
                    frames.push(frame);
                }
                Err(e) if e.is_not_found() => {
                    warn!("Data not found for {}: {}", key, e);
                    missing_regions.push(key.to_string());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let total_rows: usize = frames.iter().map(UnifiedFrame::height).sum();
        if total_rows == 0 {
            return Err(SolarstatError::EmptySelection {
                requested: keys.iter().map(|k| k.as_ref().to_string()).collect(),
            });
        }

        let frame = concat_frames(frames)?;
        info!(
            "Combined {} rows from {} regions ({} missing)",
            frame.height(),
            seen.len() - missing_regions.len(),
            missing_regions.len()
        );
        Ok(Combination {
            frame,
            missing_regions,
            region_rows,
        })
    }
}

/// Stacks frames vertically, aligning columns by name and widening types where
/// regions disagree.
fn concat_frames(frames: Vec<UnifiedFrame>) -> Result<UnifiedFrame, SolarstatError> {
    let lazy: Vec<LazyFrame> = frames.into_iter().map(|f| f.frame.lazy()).collect();
    let combined = concat_lf_diagonal(
        lazy,
        UnionArgs {
            rechunk: true,
            to_supertypes: true,
            ..Default::default()
        },
    )?
    .collect()?;
    Ok(UnifiedFrame::new(combined))
}
