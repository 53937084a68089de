//! Statistical summaries over numeric samples

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count, central tendency and spread of a sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1), 0 for fewer than two values
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Calculate basic statistics; an empty sample yields all zeros
pub fn calculate_basic_stats(values: &[f64]) -> BasicStats {
    if values.is_empty() {
        return BasicStats::default();
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let std = if count > 1 {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    BasicStats {
        count,
        mean,
        median,
        std,
        min: sorted[0],
        max: sorted[count - 1],
    }
}

/// Percentiles with linear interpolation between closest ranks
///
/// Keys are formatted as `p25`, `p50`, ... An empty sample maps every
/// requested percentile to 0.
pub fn calculate_percentiles(values: &[f64], percentiles: &[f64]) -> BTreeMap<String, f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    percentiles
        .iter()
        .map(|p| (format!("p{}", p), percentile_of_sorted(&sorted, *p)))
        .collect()
}

fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = (percentile.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_stats_empty() {
        assert_eq!(calculate_basic_stats(&[]), BasicStats::default());
    }

    #[test]
    fn test_basic_stats_known_values() {
        let stats = calculate_basic_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.median, 4.5);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        // Sample variance is 32 / 7
        assert!((stats.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_basic_stats_single_value_has_zero_spread() {
        let stats = calculate_basic_stats(&[3600.0]);
        assert_eq!(stats.median, 3600.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let result = calculate_percentiles(&values, &[25.0, 50.0, 90.0]);
        assert_eq!(result["p25"], 2.0);
        assert_eq!(result["p50"], 3.0);
        assert!((result["p90"] - 4.6).abs() < 1e-12);
    }

    #[test]
    fn test_percentiles_empty_sample() {
        let result = calculate_percentiles(&[], &[50.0, 99.0]);
        assert_eq!(result["p50"], 0.0);
        assert_eq!(result["p99"], 0.0);
    }
}
