//! Raw vs. cleaned distribution comparison for one column.

use crate::dataset::{ensure_parent_dir, load_csv};
use crate::error::{Result, ResultExt};
use crate::profiler::{ColumnStats, DataProfiler};
use crate::utils::format_float;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Summary statistics of one column before and after cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionComparison {
    pub column: String,
    pub low_quantile: f64,
    pub high_quantile: f64,
    pub original_path: PathBuf,
    pub cleaned_path: PathBuf,
    pub original: ColumnStats,
    pub cleaned: ColumnStats,
    pub generated_at: String,
}

impl DistributionComparison {
    /// Load both files and summarize `column` in each.
    pub fn from_files(
        original_path: &Path,
        cleaned_path: &Path,
        column: &str,
        low_q: f64,
        high_q: f64,
    ) -> Result<Self> {
        let original_df = load_csv(original_path)?;
        let cleaned_df = load_csv(cleaned_path)?;

        let original = DataProfiler::column_stats(&original_df, column, low_q, high_q)
            .context("In original dataset")?;
        let cleaned = DataProfiler::column_stats(&cleaned_df, column, low_q, high_q)
            .context("In cleaned dataset")?;

        info!(
            "Compared '{}': {} original values, {} cleaned values",
            column, original.count, cleaned.count
        );

        Ok(Self {
            column: column.to_string(),
            low_quantile: low_q,
            high_quantile: high_q,
            original_path: original_path.to_path_buf(),
            cleaned_path: cleaned_path.to_path_buf(),
            original,
            cleaned,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Write the comparison as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let mut file =
            File::create(path).context(format!("Failed to create {}", path.display()))?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        info!("Comparison report saved: {}", path.display());
        Ok(())
    }
}

fn cell(value: Option<f64>) -> String {
    value.map(format_float).unwrap_or_else(|| "-".to_string())
}

impl fmt::Display for DistributionComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let low = format!("q{}", format_float(self.low_quantile));
        let high = format!("q{}", format_float(self.high_quantile));

        writeln!(f, "Distribution of '{}'", self.column)?;
        writeln!(f, "{:<10} {:>18} {:>18}", "", "original", "cleaned")?;
        writeln!(
            f,
            "{:<10} {:>18} {:>18}",
            "count", self.original.count, self.cleaned.count
        )?;

        let rows = [
            ("mean", self.original.mean, self.cleaned.mean),
            ("median", self.original.median, self.cleaned.median),
            ("min", self.original.min, self.cleaned.min),
            ("max", self.original.max, self.cleaned.max),
            (low.as_str(), self.original.low, self.cleaned.low),
            (high.as_str(), self.original.high, self.cleaned.high),
        ];
        for (label, original, cleaned) in rows {
            writeln!(f, "{:<10} {:>18} {:>18}", label, cell(original), cell(cleaned))?;
        }
        Ok(())
    }
}
