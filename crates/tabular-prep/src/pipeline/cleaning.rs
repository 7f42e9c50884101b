//! Cleaning stage: deduplicate, coerce, filter outliers, enrich, write.

use crate::cleaner::{DataCleaner, derive_age, derive_brand_model};
use crate::config::CleaningConfig;
use crate::dataset::{csv_bytes, load_csv, write_outputs};
use crate::error::{PipelineError, Result};
use crate::pipeline::outliers::{OutlierFilter, QuantileBounds};
use crate::pipeline::progress::{PipelineStep, ProgressReporter, ProgressUpdate};
use crate::reporting::render_cleaning_log;
use crate::types::{CleaningSummary, Shape};
use crate::utils::{has_column, preview_records};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Columns the outlier filter needs.
pub const THRESHOLD_COLUMNS: [&str; 2] = ["selling_price", "km_driven"];

/// Rows included in the summary preview.
pub const PREVIEW_ROWS: usize = 10;

/// In-memory result of cleaning a frame, before anything is written.
#[derive(Debug)]
pub struct CleanedFrame {
    pub frame: DataFrame,
    pub initial_shape: Shape,
    pub initial_duplicates: usize,
    pub rows_dropped_dupes: usize,
    pub selling_price_bounds: QuantileBounds,
    pub km_driven_bounds: QuantileBounds,
    pub rows_dropped_outliers: usize,
    pub malformed_values: usize,
    pub baseline_year: Option<i64>,
    /// Shape right after outlier filtering, before derived columns.
    pub final_shape: Shape,
}

pub struct CleaningStage<'a> {
    config: &'a CleaningConfig,
    reporter: Option<&'a dyn ProgressReporter>,
}

impl<'a> CleaningStage<'a> {
    pub fn new(config: &'a CleaningConfig) -> Self {
        Self {
            config,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Option<&'a dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn report(&self, step: PipelineStep, message: &str) {
        if let Some(reporter) = self.reporter {
            reporter.report(ProgressUpdate::new(step, message));
        }
    }

    /// Clean a loaded frame without touching the filesystem.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when `selling_price` or `km_driven` is absent,
    /// `EmptyInput` when there are no rows or a threshold column has no
    /// numeric values.
    pub fn clean_frame(&self, df: DataFrame) -> Result<CleanedFrame> {
        for column in THRESHOLD_COLUMNS {
            if !has_column(&df, column) {
                return Err(PipelineError::MissingColumn(column.to_string()));
            }
        }
        if df.height() == 0 {
            return Err(PipelineError::EmptyInput("input has no rows".to_string()));
        }

        let initial_shape = Shape::of(&df);

        // Step 1: Duplicates
        self.report(PipelineStep::Deduplication, "Checking for duplicate rows...");
        info!("Step 1: Checking for exact duplicate rows...");
        let initial_duplicates = DataCleaner::count_duplicates(&df)?;
        let (mut df, rows_dropped_dupes) = if self.config.drop_exact_duplicates {
            DataCleaner::drop_duplicates(&df)?
        } else {
            (df, 0)
        };
        info!(
            "Found {} duplicate rows, dropped {}",
            initial_duplicates, rows_dropped_dupes
        );

        // Step 2: Numeric coercion
        self.report(PipelineStep::NumericCoercion, "Coercing numeric columns...");
        info!("Step 2: Coercing numeric columns...");
        let malformed_values = DataCleaner::coerce_numeric_columns(&mut df)?;

        // Step 3: Quantile thresholds and filtering
        self.report(PipelineStep::OutlierRemoval, "Removing quantile outliers...");
        info!(
            "Step 3: Removing outliers outside the {} / {} quantiles...",
            self.config.low_quantile, self.config.high_quantile
        );
        let (low_q, high_q) = (self.config.low_quantile, self.config.high_quantile);
        let selling_price_bounds = OutlierFilter::bounds(&df, "selling_price", low_q, high_q)?;
        let km_driven_bounds = OutlierFilter::bounds(&df, "km_driven", low_q, high_q)?;
        let (mut df, rows_dropped_outliers) = OutlierFilter::filter(
            &df,
            &[
                ("selling_price", selling_price_bounds),
                ("km_driven", km_driven_bounds),
            ],
        )?;
        info!("Dropped {} outlier rows", rows_dropped_outliers);
        let final_shape = Shape::of(&df);

        // Step 4: Derived columns
        self.report(PipelineStep::Enrichment, "Deriving brand, model and age...");
        info!("Step 4: Deriving brand, model and age...");
        derive_brand_model(&mut df)?;
        let baseline_year = derive_age(&mut df)?;
        match baseline_year {
            Some(year) => info!("Baseline year for age: {}", year),
            None => info!("No 'year' column; age not derived"),
        }

        Ok(CleanedFrame {
            frame: df,
            initial_shape,
            initial_duplicates,
            rows_dropped_dupes,
            selling_price_bounds,
            km_driven_bounds,
            rows_dropped_outliers,
            malformed_values,
            baseline_year,
            final_shape,
        })
    }

    /// Clean `input`, then write the cleaned CSV to `output` and the audit
    /// log to `log`. Either both files are written or neither is.
    pub fn run(&self, input: &Path, output: &Path, log: &Path) -> Result<CleaningSummary> {
        self.report(PipelineStep::Loading, "Loading dataset...");
        info!("Loading dataset from: {}", input.display());
        let df = load_csv(input)?;
        info!("Dataset loaded: {} rows x {} cols", df.height(), df.width());

        let mut cleaned = self.clean_frame(df)?;
        let preview = preview_records(&cleaned.frame, PREVIEW_ROWS)?;

        let csv = csv_bytes(&mut cleaned.frame)?;
        let summary = CleaningSummary {
            input_path: input.to_path_buf(),
            initial_shape: cleaned.initial_shape,
            initial_duplicates: cleaned.initial_duplicates,
            rows_dropped_dupes: cleaned.rows_dropped_dupes,
            low_quantile: self.config.low_quantile,
            high_quantile: self.config.high_quantile,
            selling_price_bounds: cleaned.selling_price_bounds,
            km_driven_bounds: cleaned.km_driven_bounds,
            rows_dropped_outliers: cleaned.rows_dropped_outliers,
            malformed_values: cleaned.malformed_values,
            baseline_year: cleaned.baseline_year,
            final_shape: cleaned.final_shape,
            output_path: output.to_path_buf(),
            log_path: log.to_path_buf(),
            preview,
        };
        let log_text = render_cleaning_log(&summary);

        self.report(PipelineStep::Writing, "Writing cleaned dataset and log...");
        info!("Step 5: Writing cleaned dataset and log...");
        write_outputs(&[(output, csv.as_slice()), (log, log_text.as_bytes())])?;

        info!("Cleaned CSV saved to: {}", output.display());
        info!("Cleaning log saved to: {}", log.display());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame() -> DataFrame {
        df![
            "name" => ["Maruti 800 AC", "Maruti 800 AC", "Hyundai Verna 1.6 SX", "Honda Amaze VX", "Tata Indica"],
            "year" => [2007i64, 2007, 2012, 2017, 2014],
            "selling_price" => ["60,000", "60,000", "6,00,000", "4,50,000", "oops"],
            "km_driven" => [70000i64, 70000, 100000, 141000, 46000],
            "fuel" => ["Petrol", "Petrol", "Diesel", "Diesel", "Petrol"],
        ]
        .unwrap()
    }

    #[test]
    fn test_clean_frame_full_range() {
        let config = CleaningConfig::builder()
            .low_quantile(0.0)
            .high_quantile(1.0)
            .build()
            .unwrap();
        let cleaned = CleaningStage::new(&config).clean_frame(raw_frame()).unwrap();

        assert_eq!(cleaned.initial_duplicates, 1);
        assert_eq!(cleaned.rows_dropped_dupes, 1);
        assert_eq!(cleaned.malformed_values, 1);
        // Only the row with an unparseable price fails the filter.
        assert_eq!(cleaned.rows_dropped_outliers, 1);
        assert_eq!(cleaned.final_shape, Shape { rows: 3, cols: 5 });
        assert_eq!(cleaned.baseline_year, Some(2017));
        assert_eq!(cleaned.selling_price_bounds, QuantileBounds { low: 60000.0, high: 600000.0 });

        let ages: Vec<Option<i64>> = cleaned
            .frame
            .column("age")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(10), Some(5), Some(0)]);
        assert_eq!(cleaned.frame.width(), 8);
    }

    #[test]
    fn test_keep_duplicates() {
        let config = CleaningConfig::builder()
            .low_quantile(0.0)
            .high_quantile(1.0)
            .drop_exact_duplicates(false)
            .build()
            .unwrap();
        let cleaned = CleaningStage::new(&config).clean_frame(raw_frame()).unwrap();
        assert_eq!(cleaned.initial_duplicates, 1);
        assert_eq!(cleaned.rows_dropped_dupes, 0);
        assert_eq!(cleaned.frame.height(), 4);
    }

    #[test]
    fn test_missing_threshold_column() {
        let df = df!["name" => ["a"], "selling_price" => [1i64]].unwrap();
        let err = CleaningStage::new(&CleaningConfig::default())
            .clean_frame(df)
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "km_driven"));
    }

    #[test]
    fn test_threshold_column_without_numbers() {
        let df = df![
            "selling_price" => ["n/a", "unknown"],
            "km_driven" => [1i64, 2],
        ]
        .unwrap();
        let err = CleaningStage::new(&CleaningConfig::default())
            .clean_frame(df)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput(_)));
    }

    #[test]
    fn test_nan_mileage_is_missing_not_a_threshold() {
        let df = df![
            "selling_price" => [100000i64, 200000, 300000, 400000, 500000],
            "km_driven" => [10000.0f64, 20000.0, f64::NAN, 40000.0, 50000.0],
        ]
        .unwrap();
        let config = CleaningConfig::builder()
            .low_quantile(0.0)
            .high_quantile(1.0)
            .build()
            .unwrap();
        let cleaned = CleaningStage::new(&config).clean_frame(df).unwrap();

        assert_eq!(cleaned.km_driven_bounds, QuantileBounds { low: 10000.0, high: 50000.0 });
        assert_eq!(cleaned.rows_dropped_outliers, 1);
        assert_eq!(cleaned.frame.height(), 4);
        assert_eq!(cleaned.malformed_values, 0);
    }

    #[test]
    fn test_failed_log_write_leaves_no_csv() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        std::fs::write(
            &raw,
            "name,year,selling_price,km_driven\nHonda City,2014,450000,50000\nTata Nano,2012,120000,30000\n",
        )
        .unwrap();
        let output = dir.path().join("clean.csv");
        let log = dir.path().join("reports");
        std::fs::create_dir_all(&log).unwrap();

        let result = CleaningStage::new(&CleaningConfig::default()).run(&raw, &output, &log);
        assert!(result.is_err());
        assert!(!output.exists());
    }
}
