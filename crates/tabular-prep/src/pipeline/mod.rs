//! Pipeline module.
//!
//! This module provides the cleaning and preprocessing stages, the apply
//! step for persisted transforms, and the [`Pipeline`] that runs them.

pub mod apply;
mod builder;
pub mod cleaning;
pub mod outliers;
pub mod preprocessing;
pub mod progress;

pub use apply::{apply_frame, apply_transform};
pub use builder::{Pipeline, PipelineBuilder, RunLayout};
pub use cleaning::{CleanedFrame, CleaningStage};
pub use outliers::{OutlierFilter, QuantileBounds};
pub use preprocessing::{PreparedSplit, PreprocessingStage};
pub use progress::{ClosureProgressReporter, PipelineStep, ProgressReporter, ProgressUpdate};
