use crate::pipeline::outliers::QuantileBounds;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Row and column count of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub cols: usize,
}

impl Shape {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            rows: df.height(),
            cols: df.width(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows × {} cols", self.rows, self.cols)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub input_path: PathBuf,
    pub initial_shape: Shape,
    /// Exact duplicate rows present in the input, whether or not dropped.
    pub initial_duplicates: usize,
    pub rows_dropped_dupes: usize,
    pub low_quantile: f64,
    pub high_quantile: f64,
    pub selling_price_bounds: QuantileBounds,
    pub km_driven_bounds: QuantileBounds,
    pub rows_dropped_outliers: usize,
    /// Numeric values that failed to parse and became missing.
    pub malformed_values: usize,
    /// `None` when the input has no `year` column.
    pub baseline_year: Option<i64>,
    pub final_shape: Shape,
    pub output_path: PathBuf,
    pub log_path: PathBuf,
    /// First rows of the cleaned data as JSON records.
    pub preview: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub input_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub x_train_shape: Shape,
    pub x_test_shape: Shape,
    pub y_train_len: usize,
    pub y_test_len: usize,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    /// Columns from the configured drop list that were present and removed.
    pub dropped_columns: Vec<String>,
    /// Set when a transform was fit and written to disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preprocessor_path: Option<PathBuf>,
}

impl PreprocessSummary {
    pub fn preprocessor_saved(&self) -> bool {
        self.preprocessor_path.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub output_shape: Shape,
    /// Categorical values not seen during fitting, encoded as all zeros.
    pub unknown_categories: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough_column: Option<String>,
}

/// Result of a clean-then-preprocess run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub cleaning: CleaningSummary,
    pub preprocessing: PreprocessSummary,
}
