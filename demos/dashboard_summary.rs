//! Loads every region in the data directory and prints the views a dashboard shows.
//!
//! Run with `SOLARSTAT_DATA_DIR=/path/to/clean cargo run --example dashboard_summary`.

use solarstat::{GroupingKey, Metric, Solarstat, SolarstatError};
use std::env;

fn main() -> Result<(), SolarstatError> {
    configure_polars_display();
    let client = Solarstat::from_env();

    let regions = client.try_list_regions()?;
    println!("Regions in {}: {:?}", client.data_dir().display(), regions);

    let combined = client.combine().regions(regions).call()?;
    for missing in &combined.missing_regions {
        println!("Data not found for {missing}");
    }
    let frame = &combined.frame;

    // --- Summary ---
    let summary = frame.summary(Metric::Ghi)?;
    println!(
        "{} records, mean GHI {:?}, from {:?} to {:?}",
        summary.records, summary.mean, summary.first, summary.last
    );

    // --- Ranking ---
    println!("\n--- Regions ranked by mean GHI ---");
    for (rank, region) in frame.rank_by_mean(Metric::Ghi)?.iter().enumerate() {
        println!("{:>2}. {:<16} {:?}", rank + 1, region.region, region.mean);
    }

    // --- Top groups ---
    let grouping = frame.grouping_key();
    println!("\n--- Top groups by {grouping} ---");
    for row in frame.top_groups(Metric::Ghi, 5)? {
        println!(
            "{:<24} n={:<8} mean={:?} median={:?} std={:?}",
            row.group, row.count, row.mean, row.median, row.std
        );
    }

    // --- Distribution sample ---
    let sample = client.distribution_sample(frame, Metric::Dni, GroupingKey::ByRegion, 5_000)?;
    println!("\nDNI sample: {} rows (sampled: {})", sample.frame.height(), sample.sampled);
    println!("{:#?}", sample.frame.frame.head(Some(5)));

    // --- Export ---
    let (bytes, file_name, content_type) = client.export(frame)?;
    println!("\n{file_name} ({content_type}): {} bytes", bytes.len());

    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 10 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "10");
}
