//! Error types for the cleaning and preprocessing stages.
//!
//! Every fatal condition a stage can hit is a variant of [`PipelineError`].
//! Value-level anomalies (unparseable numeric text, categories unseen during
//! fitting) are not errors: the stages normalize them and log a count.
//!
//! Errors serialize to `{code, message}` so the CLI can emit them as JSON.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the pipeline stages.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file does not exist or cannot be opened.
    #[error("Input file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A column required by an operation is absent.
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// The configured target column is absent.
    #[error("Target column '{0}' not found in the dataset")]
    MissingTarget(String),

    /// There are no rows (or no usable values) to compute on.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested train/test split cannot be produced.
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Transform artifact could not be encoded or decoded.
    #[error("Transform artifact error: {0}")]
    Artifact(#[from] bincode::Error),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::MissingTarget(_) => "MISSING_TARGET",
            Self::EmptyInput(_) => "EMPTY_INPUT",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidSplit(_) => "INVALID_SPLIT",
            Self::Artifact(_) => "ARTIFACT_ERROR",
            Self::Io(_) => "IO_FAILURE",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True when the error was caused by the shape of the input data rather
    /// than by the environment (paths, permissions, disk).
    pub fn is_data_error(&self) -> bool {
        match self {
            Self::MissingColumn(_) | Self::MissingTarget(_) | Self::EmptyInput(_) => true,
            Self::WithContext { source, .. } => source.is_data_error(),
            _ => false,
        }
    }
}

impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<crate::config::ConfigValidationError> for PipelineError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Io(e).with_context(context))
    }
}
