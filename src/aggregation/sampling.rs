use crate::error::SolarstatError;
use crate::types::grouping::GroupingKey;
use crate::types::metric::Metric;
use crate::types::unified_frame::UnifiedFrame;

/// Rows selected for plotting the distribution of one metric per group.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSample {
    pub metric: Metric,
    pub grouping: GroupingKey,
    /// `true` when `frame` is a random subset rather than the whole input.
    pub sampled: bool,
    pub frame: UnifiedFrame,
}

/// Bounds the number of rows handed to a distribution plot.
///
/// When the input has more than `sample_n` rows, exactly `sample_n` of them are
/// drawn uniformly without replacement using `seed`, so identical inputs always
/// yield the identical subset. Otherwise (or when `sample_n` is zero) the whole
/// frame is returned. The metric and grouping columns must exist.
pub fn distribution_sample(
    frame: &UnifiedFrame,
    metric: Metric,
    grouping: GroupingKey,
    sample_n: usize,
    seed: u64,
) -> Result<DistributionSample, SolarstatError> {
    frame.require_column(metric.column_name())?;
    frame.require_column(grouping.column_name())?;

    let sampled = sample_n > 0 && frame.height() > sample_n;
    let frame = if sampled {
        UnifiedFrame::new(
            frame
                .frame
                .sample_n_literal(sample_n, false, false, Some(seed))?,
        )
    } else {
        frame.clone()
    };

    Ok(DistributionSample {
        metric,
        grouping,
        sampled,
        frame,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::collections::HashSet;

    fn numbered_frame(n: usize) -> PolarsResult<UnifiedFrame> {
        let ids: Vec<i64> = (0..n as i64).collect();
        let ghi: Vec<f64> = ids.iter().map(|i| *i as f64 * 1.5).collect();
        let regions: Vec<&str> = ids
            .iter()
            .map(|i| if i % 2 == 0 { "benin" } else { "togo" })
            .collect();
        Ok(UnifiedFrame::new(df!(
            "id" => ids,
            "country" => regions,
            "GHI" => ghi,
        )?))
    }

    fn ids(frame: &UnifiedFrame) -> PolarsResult<Vec<i64>> {
        Ok(frame.frame.column("id")?.i64()?.into_iter().flatten().collect())
    }

    #[test]
    fn test_small_frame_is_returned_whole() -> Result<(), Box<dyn std::error::Error>> {
        let frame = numbered_frame(50)?;

        let exact = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 50, 1)?;
        let larger = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 500, 1)?;

        assert!(!exact.sampled);
        assert_eq!(exact.frame, frame);
        assert_eq!(larger.frame, frame);
        Ok(())
    }

    #[test]
    fn test_zero_disables_sampling() -> Result<(), Box<dyn std::error::Error>> {
        let frame = numbered_frame(20)?;
        let sample = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 0, 1)?;
        assert!(!sample.sampled);
        assert_eq!(sample.frame.height(), 20);
        Ok(())
    }

    #[test]
    fn test_large_frame_is_sampled_without_replacement() -> Result<(), Box<dyn std::error::Error>>
    {
        let frame = numbered_frame(1_000)?;

        let sample = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 100, 1)?;

        assert!(sample.sampled);
        assert_eq!(sample.grouping, GroupingKey::ByRegion);
        assert_eq!(sample.frame.height(), 100);
        let drawn = ids(&sample.frame)?;
        let unique: HashSet<i64> = drawn.iter().copied().collect();
        assert_eq!(unique.len(), 100);
        assert!(drawn.iter().all(|id| (0..1_000).contains(id)));
        Ok(())
    }

    #[test]
    fn test_same_seed_is_reproducible() -> Result<(), Box<dyn std::error::Error>> {
        let frame = numbered_frame(1_000)?;

        let first = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 64, 7)?;
        let second = distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 64, 7)?;

        assert_eq!(ids(&first.frame)?, ids(&second.frame)?);
        Ok(())
    }

    #[test]
    fn test_sample_does_not_touch_input() -> Result<(), Box<dyn std::error::Error>> {
        let frame = numbered_frame(300)?;
        let before = frame.clone();

        distribution_sample(&frame, Metric::Ghi, GroupingKey::ByRegion, 10, 3)?;

        assert_eq!(frame, before);
        Ok(())
    }

    #[test]
    fn test_missing_grouping_column() -> Result<(), Box<dyn std::error::Error>> {
        let frame = numbered_frame(10)?;
        let err =
            distribution_sample(&frame, Metric::Ghi, GroupingKey::ByComments, 5, 1).unwrap_err();
        assert!(matches!(err, SolarstatError::MissingColumn(ref c) if c == "Comments"));
        Ok(())
    }
}
