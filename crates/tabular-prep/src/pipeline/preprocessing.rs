//! Preprocessing stage: drop identifiers, split, fit on train, transform,
//! write partitions and the fitted transform.

use crate::config::PreprocessConfig;
use crate::dataset::{csv_bytes, load_csv, write_outputs};
use crate::error::{PipelineError, Result};
use crate::pipeline::progress::{PipelineStep, ProgressReporter, ProgressUpdate};
use crate::split::train_test_split;
use crate::transform::{ColumnTransformer, FeatureColumns, FittedTransform, PREPROCESSOR_FILE_NAME};
use crate::types::{PreprocessSummary, Shape};
use crate::utils::has_column;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Train and test partitions after transforming, target last.
#[derive(Debug)]
pub struct PreparedSplit {
    pub train: DataFrame,
    pub test: DataFrame,
    pub x_train_shape: Shape,
    pub x_test_shape: Shape,
    pub feature_columns: FeatureColumns,
    pub dropped_columns: Vec<String>,
    /// `None` when there were no feature columns to fit on.
    pub transform: Option<FittedTransform>,
}

pub struct PreprocessingStage<'a> {
    config: &'a PreprocessConfig,
    reporter: Option<&'a dyn ProgressReporter>,
}

impl<'a> PreprocessingStage<'a> {
    pub fn new(config: &'a PreprocessConfig) -> Self {
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

    /// Split and transform a loaded frame without touching the filesystem.
    pub fn prepare_frame(&self, df: DataFrame) -> Result<PreparedSplit> {
        let target = self.config.target_column.as_str();

        // Step 1: Drop identifier columns
        let dropped_columns: Vec<String> = self
            .config
            .drop_columns
            .iter()
            .filter(|name| name.as_str() != target && has_column(&df, name))
            .cloned()
            .collect();
        let df = df.drop_many(dropped_columns.iter().map(|s| PlSmallStr::from(s.as_str())));
        info!("Step 1: Dropped columns {:?}", dropped_columns);

        if !has_column(&df, target) {
            return Err(PipelineError::MissingTarget(target.to_string()));
        }

        // Step 2: Split
        self.report(PipelineStep::Splitting, "Splitting into train and test...");
        info!(
            "Step 2: Splitting {} rows (test_size={}, random_state={})...",
            df.height(),
            self.config.test_size,
            self.config.random_state
        );
        let (train, test) =
            train_test_split(&df, self.config.test_size, self.config.random_state)?;

        let y_train = train.column(target)?.clone();
        let y_test = test.column(target)?.clone();
        let x_train = train.drop(target)?;
        let x_test = test.drop(target)?;
        let x_train_shape = Shape {
            rows: train.height(),
            cols: x_train.width(),
        };
        let x_test_shape = Shape {
            rows: test.height(),
            cols: x_test.width(),
        };

        // Step 3: Fit on train only
        let feature_columns = FeatureColumns::classify(&x_train);
        debug!(
            "Numeric: {:?}, categorical: {:?}",
            feature_columns.numeric, feature_columns.categorical
        );

        let (train_out, test_out, transform) = if feature_columns.is_empty() {
            info!("Step 3: No feature columns; passing the target through");
            (train, test, None)
        } else {
            self.report(PipelineStep::Fitting, "Fitting transform on train...");
            info!("Step 3: Fitting transform on the train partition...");
            let fitted = ColumnTransformer::fit(&x_train, &feature_columns)?;

            // Step 4: Apply to both partitions
            self.report(PipelineStep::Transforming, "Transforming partitions...");
            info!("Step 4: Transforming train and test...");
            let mut train_out = fitted.transform(&x_train)?;
            let mut test_out = fitted.transform(&x_test)?;
            train_out.with_column(y_train)?;
            test_out.with_column(y_test)?;
            (train_out, test_out, Some(fitted))
        };

        Ok(PreparedSplit {
            train: train_out,
            test: test_out,
            x_train_shape,
            x_test_shape,
            feature_columns,
            dropped_columns,
            transform,
        })
    }

    /// Preprocess `input`, writing `train.csv` and `test.csv` under
    /// `output_dir` and the fitted transform under `models_dir`.
    pub fn run(&self, input: &Path, output_dir: &Path, models_dir: &Path) -> Result<PreprocessSummary> {
        self.report(PipelineStep::Loading, "Loading cleaned dataset...");
        info!("Loading dataset from: {}", input.display());
        let df = load_csv(input)?;

        let mut prepared = self.prepare_frame(df)?;

        let train_path = output_dir.join("train.csv");
        let test_path = output_dir.join("test.csv");
        let train_csv = csv_bytes(&mut prepared.train)?;
        let test_csv = csv_bytes(&mut prepared.test)?;
        let (preprocessor_path, artifact) = match &prepared.transform {
            Some(fitted) => (
                Some(models_dir.join(PREPROCESSOR_FILE_NAME)),
                Some(fitted.to_bytes()?),
            ),
            None => (None, None),
        };

        self.report(PipelineStep::Writing, "Writing partitions...");
        let mut outputs = vec![
            (train_path.as_path(), train_csv.as_slice()),
            (test_path.as_path(), test_csv.as_slice()),
        ];
        if let (Some(path), Some(bytes)) = (&preprocessor_path, &artifact) {
            outputs.push((path.as_path(), bytes.as_slice()));
        }
        write_outputs(&outputs)?;
        info!("Saved {} and {}", train_path.display(), test_path.display());
        if let Some(path) = &preprocessor_path {
            info!("Preprocessor saved: {}", path.display());
        }

        Ok(PreprocessSummary {
            input_path: input.to_path_buf(),
            train_path,
            test_path,
            x_train_shape: prepared.x_train_shape,
            x_test_shape: prepared.x_test_shape,
            y_train_len: prepared.train.height(),
            y_test_len: prepared.test.height(),
            numeric_columns: prepared.feature_columns.numeric,
            categorical_columns: prepared.feature_columns.categorical,
            dropped_columns: prepared.dropped_columns,
            preprocessor_path,
        })
    }
}
