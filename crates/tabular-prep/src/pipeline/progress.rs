//! Progress reporting for the cleaning and preprocessing stages.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_prep::Pipeline;
//!
//! let summary = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .clean(input, output, log)?;
//! ```

use serde::{Deserialize, Serialize};

/// Steps reported while a stage runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    /// Reading the input CSV
    Loading,
    /// Counting and dropping exact duplicates
    Deduplication,
    /// Parsing numeric-like text columns
    NumericCoercion,
    /// Computing quantile thresholds and filtering rows
    OutlierRemoval,
    /// Deriving brand, model and age
    Enrichment,
    /// Shuffling rows into train and test partitions
    Splitting,
    /// Fitting the column transform on train
    Fitting,
    /// Applying the fitted transform
    Transforming,
    /// Writing CSV files, logs and artifacts
    Writing,
    /// Stage completed successfully
    Complete,
    /// Stage failed with an error
    Failed,
}

impl PipelineStep {
    /// Returns a human-readable name for the step.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Deduplication => "Removing Duplicates",
            Self::NumericCoercion => "Coercing Numbers",
            Self::OutlierRemoval => "Removing Outliers",
            Self::Enrichment => "Deriving Columns",
            Self::Splitting => "Splitting",
            Self::Fitting => "Fitting Transform",
            Self::Transforming => "Transforming",
            Self::Writing => "Writing Outputs",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Cumulative progress (0.0 - 1.0) at the start of this step.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Deduplication | Self::Splitting => 0.15,
            Self::NumericCoercion | Self::Fitting => 0.35,
            Self::OutlierRemoval | Self::Transforming => 0.55,
            Self::Enrichment => 0.75,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// Progress update emitted by a running stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub step: PipelineStep,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(step: PipelineStep, message: impl Into<String>) -> Self {
        Self {
            step,
            progress: step.base_progress().clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStep::Complete, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(PipelineStep::Failed, message)
    }
}

/// Receives progress updates from a running stage.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
