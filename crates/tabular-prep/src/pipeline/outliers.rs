//! Quantile-based outlier exclusion.
//!
//! Bounds are computed per column over non-missing values with linear
//! interpolation between order statistics, then applied as inclusive
//! row filters.

use crate::cleaner::present_values;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Linear-interpolated quantile of already sorted values.
///
/// Uses `pos = q * (n - 1)` and interpolates between the two neighbouring
/// order statistics. Returns `None` for an empty slice.
pub fn quantile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Sort values ascending, treating them as totally ordered.
pub fn sorted_values(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Inclusive lower and upper bound for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantileBounds {
    pub low: f64,
    pub high: f64,
}

impl QuantileBounds {
    /// True when `value` lies inside the bounds, ends included.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// Computes quantile bounds and applies them as row filters.
pub struct OutlierFilter;

impl OutlierFilter {
    /// Compute `(low_q, high_q)` bounds of a column over its non-missing
    /// values.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when the column is absent, `EmptyInput` when it holds
    /// no numeric values.
    pub fn bounds(df: &DataFrame, column: &str, low_q: f64, high_q: f64) -> Result<QuantileBounds> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::MissingColumn(column.to_string()))?
            .as_materialized_series();

        let sorted = sorted_values(present_values(series)?);
        match (quantile_linear(&sorted, low_q), quantile_linear(&sorted, high_q)) {
            (Some(low), Some(high)) => {
                debug!(
                    "Column '{}': {} values, bounds [{}, {}]",
                    column,
                    sorted.len(),
                    low,
                    high
                );
                Ok(QuantileBounds { low, high })
            }
            _ => Err(PipelineError::EmptyInput(format!(
                "column '{}' has no numeric values to compute thresholds on",
                column
            ))),
        }
    }

    /// Row mask that is `true` where the column value lies within `bounds`.
    /// Missing values fail the test.
    pub fn inclusive_mask(df: &DataFrame, column: &str, bounds: QuantileBounds) -> Result<Vec<bool>> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::MissingColumn(column.to_string()))?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        Ok(series
            .f64()?
            .into_iter()
            .map(|opt| opt.is_some_and(|v| bounds.contains(v)))
            .collect())
    }

    /// Keep only rows whose value lies within the bounds of every listed
    /// column. Returns the filtered frame and the number of rows removed.
    pub fn filter(df: &DataFrame, bounds: &[(&str, QuantileBounds)]) -> Result<(DataFrame, usize)> {
        let mut keep = vec![true; df.height()];
        for (column, column_bounds) in bounds {
            let mask = Self::inclusive_mask(df, column, *column_bounds)?;
            for (k, m) in keep.iter_mut().zip(mask) {
                *k &= m;
            }
        }

        let mask = BooleanChunked::from_slice("mask".into(), &keep);
        let filtered = df.filter(&mask)?;
        let removed = df.height() - filtered.height();
        debug!("Removed {} outlier rows", removed);
        Ok((filtered, removed))
    }
}
