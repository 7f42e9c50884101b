//! Main pipeline module.
//!
//! This module provides the `Pipeline` struct and builder that run the
//! cleaning and preprocessing stages with a shared configuration and an
//! optional progress reporter.

use crate::config::{CleaningConfig, PipelineConfig, PreprocessConfig};
use crate::error::Result;
use crate::pipeline::cleaning::CleaningStage;
use crate::pipeline::preprocessing::PreprocessingStage;
use crate::pipeline::progress::{ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::types::{CleaningSummary, PreprocessSummary, RunSummary};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// File locations used by [`Pipeline::run`] under a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    pub cleaned_csv: PathBuf,
    pub cleaning_log: PathBuf,
    pub features_dir: PathBuf,
    pub models_dir: PathBuf,
}

impl RunLayout {
    pub fn under(workdir: &Path) -> Self {
        let data = workdir.join("data");
        Self {
            cleaned_csv: data.join("data_cleaned.csv"),
            cleaning_log: workdir.join("reports").join("cleaning_log.txt"),
            features_dir: data.join("features"),
            models_dir: workdir.join("models"),
        }
    }
}

/// Runs the cleaning and preprocessing stages.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_prep::{Pipeline, PipelineConfig};
///
/// let pipeline = Pipeline::builder()
///     .config(PipelineConfig::from_json_file(Path::new("pipeline.json"))?)
///     .on_progress(|update| println!("{}", update.message))
///     .build()?;
///
/// let cleaning = pipeline.clean(raw, cleaned, log)?;
/// let features = pipeline.preprocess(cleaned, features_dir, models_dir)?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn reporter(&self) -> Option<&dyn ProgressReporter> {
        self.progress_reporter.as_deref()
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Report completion or failure of a stage result.
    fn finish<T>(&self, stage: &str, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.report_progress(ProgressUpdate::complete(format!("{} complete", stage)));
                Ok(value)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("{} failed: {}", stage, e);
                Err(e)
            }
        }
    }

    /// Run the cleaning stage.
    pub fn clean(&self, input: &Path, output: &Path, log: &Path) -> Result<CleaningSummary> {
        let start = Instant::now();
        info!("Starting cleaning stage...");
        let result = CleaningStage::new(&self.config.cleaning)
            .with_reporter(self.reporter())
            .run(input, output, log);
        let result = self.finish("Cleaning", result)?;
        info!("Cleaning finished in {:.2?}", start.elapsed());
        Ok(result)
    }

    /// Run the preprocessing stage.
    pub fn preprocess(
        &self,
        input: &Path,
        output_dir: &Path,
        models_dir: &Path,
    ) -> Result<PreprocessSummary> {
        let start = Instant::now();
        info!("Starting preprocessing stage...");
        let result = PreprocessingStage::new(&self.config.preprocessing)
            .with_reporter(self.reporter())
            .run(input, output_dir, models_dir);
        let result = self.finish("Preprocessing", result)?;
        info!("Preprocessing finished in {:.2?}", start.elapsed());
        Ok(result)
    }

    /// Clean `input`, then preprocess the cleaned output, laying files out
    /// under `workdir` per [`RunLayout`].
    pub fn run(&self, input: &Path, workdir: &Path) -> Result<RunSummary> {
        let layout = RunLayout::under(workdir);
        let cleaning = self.clean(input, &layout.cleaned_csv, &layout.cleaning_log)?;
        let preprocessing =
            self.preprocess(&layout.cleaned_csv, &layout.features_dir, &layout.models_dir)?;
        Ok(RunSummary {
            cleaning,
            preprocessing,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl PipelineBuilder {
    /// Set the full configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace only the cleaning configuration.
    pub fn cleaning(mut self, cleaning: CleaningConfig) -> Self {
        self.config.get_or_insert_with(PipelineConfig::default).cleaning = cleaning;
        self
    }

    /// Replace only the preprocessing configuration.
    pub fn preprocessing(mut self, preprocessing: PreprocessConfig) -> Self {
        self.config.get_or_insert_with(PipelineConfig::default).preprocessing = preprocessing;
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback using a closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, validating the configuration.
    pub fn build(self) -> Result<Pipeline> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::progress::PipelineStep;
    use std::sync::Mutex;

    #[test]
    fn test_build_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config(), &PipelineConfig::default());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.preprocessing.test_size = 1.5;
        let err = Pipeline::builder().config(config).build().err().unwrap();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_layout() {
        let layout = RunLayout::under(Path::new("work"));
        assert_eq!(layout.cleaned_csv, Path::new("work/data/data_cleaned.csv"));
        assert_eq!(layout.features_dir, Path::new("work/data/features"));
        assert_eq!(layout.models_dir, Path::new("work/models"));
    }

    #[test]
    fn test_failure_is_reported() {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&steps);
        let pipeline = Pipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.step))
            .build()
            .unwrap();

        let result = pipeline.clean(
            Path::new("missing/raw.csv"),
            Path::new("missing/out.csv"),
            Path::new("missing/log.txt"),
        );
        assert!(result.is_err());
        assert_eq!(steps.lock().unwrap().last(), Some(&PipelineStep::Failed));
    }
}
