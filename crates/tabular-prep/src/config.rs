//! Configuration types for the cleaning and preprocessing stages.
//!
//! Every default the stages rely on lives here as an explicit, documented
//! field. Configs are built with a fluent builder and validated on `build()`,
//! and they (de)serialize with serde so a whole run can be described in a
//! JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default lower quantile for outlier exclusion.
pub const DEFAULT_LOW_QUANTILE: f64 = 0.005;
/// Default upper quantile for outlier exclusion.
pub const DEFAULT_HIGH_QUANTILE: f64 = 0.995;
/// Default target column.
pub const DEFAULT_TARGET_COLUMN: &str = "selling_price";
/// Default fraction of rows assigned to the test partition.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default seed for the train/test shuffle.
pub const DEFAULT_RANDOM_STATE: u64 = 42;

/// Identifier and free-text columns dropped before feature preprocessing.
pub fn default_drop_columns() -> Vec<String> {
    ["name", "year", "model"].iter().map(|s| s.to_string()).collect()
}

/// Configuration for the cleaning stage.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_prep::config::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .low_quantile(0.01)
///     .high_quantile(0.99)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Lower quantile bound used for `selling_price` and `km_driven`.
    /// Default: 0.005
    pub low_quantile: f64,

    /// Upper quantile bound used for `selling_price` and `km_driven`.
    /// Default: 0.995
    pub high_quantile: f64,

    /// Whether to drop rows that are identical across all columns.
    /// Default: true
    pub drop_exact_duplicates: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            low_quantile: DEFAULT_LOW_QUANTILE,
            high_quantile: DEFAULT_HIGH_QUANTILE,
            drop_exact_duplicates: true,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let (low, high) = (self.low_quantile, self.high_quantile);
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(ConfigValidationError::InvalidQuantiles { low, high });
        }
        Ok(())
    }
}

/// Configuration for the preprocessing stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Columns removed before splitting. Listed columns that are absent are
    /// ignored.
    /// Default: ["name", "year", "model"]
    pub drop_columns: Vec<String>,

    /// Column separated from the features and re-attached after transforming.
    /// Default: "selling_price"
    pub target_column: String,

    /// Fraction of rows assigned to the test partition, in (0, 1).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the shuffle that assigns rows to partitions.
    /// Default: 42
    pub random_state: u64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            drop_columns: default_drop_columns(),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }
}

impl PreprocessConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessConfigBuilder {
        PreprocessConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }
        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTargetColumn);
        }
        Ok(())
    }
}

/// Configuration for a full clean-then-preprocess run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cleaning: CleaningConfig,
    pub preprocessing: PreprocessConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// defaults.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| crate::error::PipelineError::FileNotFound(path.to_path_buf()))?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both stage configurations.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.cleaning.validate()?;
        self.preprocessing.validate()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid quantiles: low={low}, high={high} (must satisfy 0 <= low < high <= 1)")]
    InvalidQuantiles { low: f64, high: f64 },

    #[error("Invalid test size: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidTestSize(f64),

    #[error("Target column name must not be empty")]
    EmptyTargetColumn,
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    low_quantile: Option<f64>,
    high_quantile: Option<f64>,
    drop_exact_duplicates: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set the lower quantile bound (0.0 - 1.0).
    pub fn low_quantile(mut self, q: f64) -> Self {
        self.low_quantile = Some(q);
        self
    }

    /// Set the upper quantile bound (0.0 - 1.0).
    pub fn high_quantile(mut self, q: f64) -> Self {
        self.high_quantile = Some(q);
        self
    }

    /// Enable or disable exact duplicate removal.
    pub fn drop_exact_duplicates(mut self, drop: bool) -> Self {
        self.drop_exact_duplicates = Some(drop);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            low_quantile: self.low_quantile.unwrap_or(DEFAULT_LOW_QUANTILE),
            high_quantile: self.high_quantile.unwrap_or(DEFAULT_HIGH_QUANTILE),
            drop_exact_duplicates: self.drop_exact_duplicates.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`PreprocessConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessConfigBuilder {
    drop_columns: Option<Vec<String>>,
    target_column: Option<String>,
    test_size: Option<f64>,
    random_state: Option<u64>,
}

impl PreprocessConfigBuilder {
    /// Replace the list of columns dropped before splitting.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the target column.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the test partition fraction.
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<PreprocessConfig, ConfigValidationError> {
        let config = PreprocessConfig {
            drop_columns: self.drop_columns.unwrap_or_else(default_drop_columns),
            target_column: self
                .target_column
                .unwrap_or_else(|| DEFAULT_TARGET_COLUMN.to_string()),
            test_size: self.test_size.unwrap_or(DEFAULT_TEST_SIZE),
            random_state: self.random_state.unwrap_or(DEFAULT_RANDOM_STATE),
        };

        config.validate()?;
        Ok(config)
    }
}
