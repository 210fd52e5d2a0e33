//! Fixtures shared by the unit tests.

use crate::regions::region_catalog::region_file_name;
use crate::types::unified_frame::UnifiedFrame;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::{Path, PathBuf};

pub fn datetime(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test datetime")
}

/// Writes `contents` as the data file of region `key` in `dir`.
pub fn write_region_file(dir: &Path, key: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(region_file_name(key));
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// CSV text with one row per GHI value, one minute apart from 2021-08-09 00:00.
pub fn region_csv(ghi: &[f64]) -> String {
    let mut csv = String::from("Timestamp,GHI,DNI,DHI\n");
    for (i, value) in ghi.iter().enumerate() {
        let ts = datetime(2021, 8, 9, 0, 0) + Duration::minutes(i as i64);
        csv.push_str(&format!(
            "{},{},{},{}\n",
            ts.format("%Y-%m-%d %H:%M"),
            value,
            value / 2.0,
            value / 4.0
        ));
    }
    csv
}

/// A unified frame for one region with `Timestamp`, `GHI` and `country` columns,
/// one minute apart from 2021-08-09 00:00.
pub fn region_frame(region: &str, ghi: &[Option<f64>]) -> UnifiedFrame {
    let timestamps: Vec<NaiveDateTime> = (0..ghi.len())
        .map(|i| datetime(2021, 8, 9, 0, 0) + Duration::minutes(i as i64))
        .collect();
    let timestamp = DatetimeChunked::from_naive_datetime(
        "Timestamp".into(),
        timestamps,
        TimeUnit::Milliseconds,
    )
    .into_column();
    let regions = vec![region; ghi.len()];
    let frame = DataFrame::new(vec![
        timestamp,
        Column::new("GHI".into(), ghi.to_vec()),
        Column::new("country".into(), regions),
    ])
    .expect("consistent test frame");
    UnifiedFrame::new(frame)
}
