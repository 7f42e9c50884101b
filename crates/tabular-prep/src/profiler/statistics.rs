//! Summary statistics over numeric values.

use crate::pipeline::outliers::{quantile_linear, sorted_values};
use serde::{Deserialize, Serialize};

/// Arithmetic mean, `None` when there are no values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn population_std(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Numeric summary of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Value at the configured lower quantile.
    pub low: Option<f64>,
    /// Value at the configured upper quantile.
    pub high: Option<f64>,
}

impl ColumnStats {
    pub fn from_values(values: Vec<f64>, low_q: f64, high_q: f64) -> Self {
        let sorted = sorted_values(values);
        Self {
            count: sorted.len(),
            mean: mean(&sorted),
            median: quantile_linear(&sorted, 0.5),
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            low: quantile_linear(&sorted, low_q),
            high: quantile_linear(&sorted, high_q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values).unwrap();
        assert_eq!(m, 5.0);
        assert_eq!(population_std(&values, m), 2.0);
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::from_values(vec![5.0, 1.0, 3.0, 2.0, 4.0], 0.0, 1.0);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.median, Some(3.0));
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.low, Some(1.0));
        assert_eq!(stats.high, Some(5.0));
    }

    #[test]
    fn test_column_stats_empty() {
        let stats = ColumnStats::from_values(Vec::new(), 0.005, 0.995);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_none());
        assert!(stats.median.is_none());
        assert!(stats.low.is_none());
    }
}
