//! Tabular Preparation Library
//!
//! Deterministic cleaning and feature preprocessing for a car-price dataset,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! - **Cleaning**: exact duplicate removal, numeric coercion of
//!   thousands-separated text, quantile outlier exclusion, and derivation
//!   of `brand`, `model` and `age`, with a plain-text audit log
//! - **Preprocessing**: identifier column removal, seeded train/test split,
//!   standardization and indicator expansion fit on train only, and a
//!   persisted transform
//! - **Apply**: reuse a persisted transform on new feature files
//! - **Comparison**: raw vs. cleaned summary statistics of one column
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabular_prep::{Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let cleaning = pipeline.clean(
//!     Path::new("data/car_details.csv"),
//!     Path::new("data/data_cleaned.csv"),
//!     Path::new("reports/cleaning_log.txt"),
//! )?;
//! println!("Final shape: {}", cleaning.final_shape);
//!
//! let features = pipeline.preprocess(
//!     Path::new("data/data_cleaned.csv"),
//!     Path::new("data/features"),
//!     Path::new("models"),
//! )?;
//! println!("Train: {}, test: {}", features.x_train_shape, features.x_test_shape);
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use tabular_prep::config::*;
//!
//! let cleaning = CleaningConfig::builder()
//!     .low_quantile(0.01)
//!     .high_quantile(0.99)
//!     .build()?;
//!
//! let preprocessing = PreprocessConfig::builder()
//!     .drop_columns(["name", "year", "model"])
//!     .target_column("selling_price")
//!     .test_size(0.2)
//!     .random_state(42)
//!     .build()?;
//! ```

pub mod cleaner;
pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod split;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DataCleaner;
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, PipelineConfig,
    PreprocessConfig, PreprocessConfigBuilder,
};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, CleaningStage, OutlierFilter, Pipeline, PipelineBuilder, PipelineStep,
    PreprocessingStage, ProgressReporter, ProgressUpdate, QuantileBounds, RunLayout,
    apply_transform,
};
pub use profiler::{ColumnStats, DataProfiler};
pub use reporting::DistributionComparison;
pub use split::{split_indices, train_test_split};
pub use transform::{ColumnTransformer, FeatureColumns, FittedTransform};
pub use types::{ApplySummary, CleaningSummary, PreprocessSummary, RunSummary, Shape};
