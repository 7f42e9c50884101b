//! Column profiling for distribution comparison.
//!
//! Computes count, mean, median, extremes and quantiles of a numeric-like
//! column, using the same numeric coercion as the cleaning stage.

mod statistics;

pub use statistics::{mean, population_std, ColumnStats};

use crate::cleaner::present_values;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::debug;

/// Data profiler for per-column numeric summaries.
pub struct DataProfiler;

impl DataProfiler {
    /// Summarize one column of `df`.
    ///
    /// A column with no numeric values yields `count = 0` and no other
    /// statistics.
    pub fn column_stats(df: &DataFrame, column: &str, low_q: f64, high_q: f64) -> Result<ColumnStats> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::MissingColumn(column.to_string()))?
            .as_materialized_series();

        let values = present_values(series)?;
        debug!("Column '{}': {} numeric values", column, values.len());
        Ok(ColumnStats::from_values(values, low_q, high_q))
    }
}
