//! Plain-text audit log written next to the cleaned CSV.

use crate::types::CleaningSummary;
use crate::utils::format_float;

/// Render the audit log for one cleaning run. Lines are joined by `\n`
/// with no trailing newline.
pub fn render_cleaning_log(summary: &CleaningSummary) -> String {
    let input_name = summary
        .input_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| summary.input_path.display().to_string());

    let low_pct = format_float(summary.low_quantile * 100.0);
    let high_pct = format_float(summary.high_quantile * 100.0);
    let baseline = summary
        .baseline_year
        .map(|year| year.to_string())
        .unwrap_or_else(|| "undefined".to_string());

    let lines = [
        format!("# Cleaning log for {}", input_name),
        format!("Original shape: {}", summary.initial_shape),
        format!("Exact duplicate rows dropped: {}", summary.rows_dropped_dupes),
        format!(
            "Rows dropped due to outlier removal: {}",
            summary.rows_dropped_outliers
        ),
        format!(
            "Selling price thresholds ({}th, {}th): {}, {}",
            low_pct,
            high_pct,
            format_float(summary.selling_price_bounds.low),
            format_float(summary.selling_price_bounds.high)
        ),
        format!(
            "km_driven thresholds ({}th, {}th): {}, {}",
            low_pct,
            high_pct,
            format_float(summary.km_driven_bounds.low),
            format_float(summary.km_driven_bounds.high)
        ),
        format!("Baseline year used for age computation: {}", baseline),
        format!("Final shape after cleaning: {}", summary.final_shape),
        format!("Cleaned CSV saved to: {}", summary.output_path.display()),
    ];

    lines.join("\n")
}
