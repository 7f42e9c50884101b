//! Column transform fit on the training partition and applied unchanged to
//! every other frame.
//!
//! Fitting is done by [`ColumnTransformer::fit`], which returns an immutable
//! [`FittedTransform`]. The fitted value has no mutating methods, so a
//! transform cannot be re-fit on test or inference data once created.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabular_prep::transform::{ColumnTransformer, FeatureColumns, FittedTransform};
//!
//! let columns = FeatureColumns::classify(&x_train);
//! let fitted = ColumnTransformer::fit(&x_train, &columns)?;
//! let train = fitted.transform(&x_train)?;
//! let test = fitted.transform(&x_test)?;
//! fitted.save(Path::new("models/preprocessor.bin"))?;
//!
//! let reloaded = FittedTransform::load(Path::new("models/preprocessor.bin"))?;
//! ```

mod encoder;
mod scaler;

pub use encoder::{CategoryList, Encoded, OneHotEncoder};
pub use scaler::{ScaleParams, StandardScaler};

use crate::dataset::write_outputs;
use crate::error::{PipelineError, Result};
use crate::utils::{DtypeCategory, column_names, get_dtype_category, has_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// File name of the persisted transform inside the models directory.
pub const PREPROCESSOR_FILE_NAME: &str = "preprocessor.bin";

/// Feature columns split by how they are transformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureColumns {
    /// Integer and float columns, standardized.
    pub numeric: Vec<String>,
    /// Every other column, expanded into indicators.
    pub categorical: Vec<String>,
}

impl FeatureColumns {
    /// Classify every column of `df` by dtype, keeping frame order.
    pub fn classify(df: &DataFrame) -> Self {
        let mut columns = Self::default();
        for column in df.get_columns() {
            let name = column.name().to_string();
            match get_dtype_category(column.dtype()) {
                DtypeCategory::Numeric => columns.numeric.push(name),
                category => {
                    debug!("Column '{}' ({:?}) treated as categorical", name, category);
                    columns.categorical.push(name);
                }
            }
        }
        columns
    }

    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// All input columns, numeric first.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.numeric.iter().chain(&self.categorical)
    }
}

/// Fits a [`FittedTransform`] from training features.
pub struct ColumnTransformer;

impl ColumnTransformer {
    /// Learn scaling parameters and category lists from `train` only.
    ///
    /// A sub-transform with no columns is skipped.
    pub fn fit(train: &DataFrame, columns: &FeatureColumns) -> Result<FittedTransform> {
        if train.height() == 0 {
            return Err(PipelineError::EmptyInput(
                "cannot fit a transform on zero rows".to_string(),
            ));
        }
        for name in columns.all() {
            if !has_column(train, name) {
                return Err(PipelineError::MissingColumn(name.clone()));
            }
        }

        let scaler = if columns.numeric.is_empty() {
            None
        } else {
            Some(StandardScaler::fit(train, &columns.numeric)?)
        };
        let encoder = if columns.categorical.is_empty() {
            None
        } else {
            Some(OneHotEncoder::fit(train, &columns.categorical)?)
        };

        let fitted = FittedTransform {
            columns: columns.clone(),
            scaler,
            encoder,
        };
        info!(
            "Fitted transform: {} numeric, {} categorical -> {} output columns",
            columns.numeric.len(),
            columns.categorical.len(),
            fitted.output_columns().len()
        );
        Ok(fitted)
    }
}

/// Frame produced by [`FittedTransform::transform_with_stats`].
#[derive(Debug)]
pub struct TransformOutput {
    pub frame: DataFrame,
    pub unknown_categories: usize,
}

/// Immutable fitted transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransform {
    columns: FeatureColumns,
    scaler: Option<StandardScaler>,
    encoder: Option<OneHotEncoder>,
}

// Shared read-only across inference threads.
static_assertions::assert_impl_all!(FittedTransform: Send, Sync);

impl FittedTransform {
    /// Input columns the transform was fit on.
    pub fn feature_columns(&self) -> &FeatureColumns {
        &self.columns
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn encoder(&self) -> Option<&OneHotEncoder> {
        self.encoder.as_ref()
    }

    /// Output column names: numeric columns, then indicators grouped by
    /// source column in fitted category order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scaler
            .iter()
            .flat_map(|s| s.columns().map(str::to_string))
            .collect();
        if let Some(encoder) = &self.encoder {
            for list in encoder.category_lists() {
                names.extend(list.indicator_names());
            }
        }
        names
    }

    /// Apply the transform to `df`. Columns not seen at fit time are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        Ok(self.transform_with_stats(df)?.frame)
    }

    /// Apply the transform and report how many categorical values were
    /// unseen during fitting.
    ///
    /// # Errors
    ///
    /// `MissingColumn` when a fitted input column is absent from `df`.
    pub fn transform_with_stats(&self, df: &DataFrame) -> Result<TransformOutput> {
        for name in self.columns.all() {
            if !has_column(df, name) {
                return Err(PipelineError::MissingColumn(name.clone()));
            }
        }

        let mut output: Vec<Column> = Vec::new();
        if let Some(scaler) = &self.scaler {
            output.extend(scaler.transform(df)?.into_iter().map(Column::from));
        }

        let mut unknown_categories = 0;
        if let Some(encoder) = &self.encoder {
            let encoded = encoder.transform(df)?;
            unknown_categories = encoded.unknown;
            output.extend(encoded.columns.into_iter().map(Column::from));
        }

        if unknown_categories > 0 {
            info!(
                "{} categorical values unseen during fitting were encoded as zeros",
                unknown_categories
            );
        }

        let frame = DataFrame::new(output)?;
        debug!(
            "Transformed {} rows: {:?} -> {:?}",
            df.height(),
            column_names(df),
            column_names(&frame)
        );
        Ok(TransformOutput {
            frame,
            unknown_categories,
        })
    }

    /// Bincode encoding of the transform, as written by [`FittedTransform::save`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Serialize with bincode to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_outputs(&[(path, bytes.as_slice())])?;
        info!("Preprocessor saved: {}", path.display());
        Ok(())
    }

    /// Load a transform written by [`FittedTransform::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| PipelineError::FileNotFound(path.to_path_buf()))?;
        let fitted = bincode::deserialize_from(BufReader::new(file))?;
        debug!("Preprocessor loaded: {}", path.display());
        Ok(fitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn train_frame() -> DataFrame {
        df![
            "km_driven" => [10000i64, 20000, 30000, 40000],
            "fuel" => ["Petrol", "Diesel", "Petrol", "CNG"],
            "age" => [1i64, 3, 5, 7],
        ]
        .unwrap()
    }

    #[test]
    fn test_classify_keeps_frame_order() {
        let columns = FeatureColumns::classify(&train_frame());
        assert_eq!(columns.numeric, vec!["km_driven", "age"]);
        assert_eq!(columns.categorical, vec!["fuel"]);
    }

    #[test]
    fn test_output_column_order() {
        let train = train_frame();
        let fitted = ColumnTransformer::fit(&train, &FeatureColumns::classify(&train)).unwrap();
        let out = fitted.transform(&train).unwrap();

        assert_eq!(
            column_names(&out),
            vec!["km_driven", "age", "fuel_Petrol", "fuel_Diesel", "fuel_CNG"]
        );
        assert_eq!(column_names(&out), fitted.output_columns());
    }

    #[test]
    fn test_train_columns_standardized() {
        let train = train_frame();
        let fitted = ColumnTransformer::fit(&train, &FeatureColumns::classify(&train)).unwrap();
        let out = fitted.transform(&train).unwrap();

        for name in ["km_driven", "age"] {
            let values: Vec<f64> = out
                .column(name)
                .unwrap()
                .as_materialized_series()
                .f64()
                .unwrap()
                .into_iter()
                .flatten()
                .collect();
            let m = crate::profiler::mean(&values).unwrap();
            let std = crate::profiler::population_std(&values, m);
            assert!(m.abs() < 1e-9);
            assert!((std - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_input_column() {
        let train = train_frame();
        let fitted = ColumnTransformer::fit(&train, &FeatureColumns::classify(&train)).unwrap();

        let other = df!["km_driven" => [1i64], "age" => [2i64]].unwrap();
        let err = fitted.transform(&other).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(ref c) if c == "fuel"));
    }

    #[test]
    fn test_numeric_only_skips_encoder() {
        let train = df!["km_driven" => [1.0f64, 2.0, 3.0]].unwrap();
        let fitted = ColumnTransformer::fit(&train, &FeatureColumns::classify(&train)).unwrap();
        assert!(fitted.encoder().is_none());
        assert!(fitted.scaler().is_some());
    }

    #[test]
    fn test_save_and_load_produce_identical_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models").join(PREPROCESSOR_FILE_NAME);

        let train = train_frame();
        let fitted = ColumnTransformer::fit(&train, &FeatureColumns::classify(&train)).unwrap();
        fitted.save(&path).unwrap();

        let reloaded = FittedTransform::load(&path).unwrap();
        assert_eq!(reloaded, fitted);

        let test = df![
            "km_driven" => [25000i64],
            "fuel" => ["Electric"],
            "age" => [2i64],
        ]
        .unwrap();
        let a = fitted.transform_with_stats(&test).unwrap();
        let b = reloaded.transform_with_stats(&test).unwrap();
        assert!(a.frame.equals_missing(&b.frame));
        assert_eq!(a.unknown_categories, 1);
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = FittedTransform::load(Path::new("nope/preprocessor.bin")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
