//! CLI entry point for the cleaning and preprocessing stages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tabular_prep::config::{
    DEFAULT_HIGH_QUANTILE, DEFAULT_LOW_QUANTILE, DEFAULT_RANDOM_STATE, DEFAULT_TARGET_COLUMN,
    DEFAULT_TEST_SIZE, default_drop_columns,
};
use tabular_prep::{
    ApplySummary, CleaningConfig, CleaningSummary, DistributionComparison, Pipeline,
    PipelineConfig, PreprocessConfig, PreprocessSummary, RunLayout, RunSummary, apply_transform,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Deterministic cleaning and preprocessing for car-price datasets",
    long_about = "Cleans a raw car-price CSV, splits it into train/test partitions and fits a \
                  feature transform on the training rows only.\n\n\
                  EXAMPLES:\n  \
                  # Clean a raw dataset\n  \
                  tabular-prep clean -i data/car_details.csv -o data/data_cleaned.csv --log reports/cleaning_log.txt\n\n  \
                  # Split and transform the cleaned dataset\n  \
                  tabular-prep preprocess -i data/data_cleaned.csv --output-dir data/features --models-dir models\n\n  \
                  # Both stages under one working directory\n  \
                  tabular-prep run -i data/car_details.csv --workdir out"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deduplicate, coerce, filter outliers and derive brand/model/age
    Clean {
        /// Raw CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Cleaned CSV destination
        #[arg(short, long)]
        output: PathBuf,

        /// Cleaning log destination
        #[arg(long)]
        log: PathBuf,

        /// Lower quantile for outlier exclusion
        #[arg(long, default_value_t = DEFAULT_LOW_QUANTILE)]
        low_quantile: f64,

        /// Upper quantile for outlier exclusion
        #[arg(long, default_value_t = DEFAULT_HIGH_QUANTILE)]
        high_quantile: f64,

        /// Keep exact duplicate rows
        #[arg(long)]
        keep_duplicates: bool,

        /// Print the summary as JSON to stdout (disables logging)
        #[arg(long)]
        json: bool,
    },

    /// Split, fit the transform on train and write train/test partitions
    Preprocess {
        /// Cleaned CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for train.csv and test.csv
        #[arg(long)]
        output_dir: PathBuf,

        /// Directory for the fitted transform
        #[arg(long)]
        models_dir: PathBuf,

        /// Target column
        #[arg(short, long, default_value = DEFAULT_TARGET_COLUMN)]
        target: String,

        /// Column to drop before splitting (repeatable; replaces the default list)
        #[arg(long = "drop-column")]
        drop_columns: Vec<String>,

        /// Fraction of rows in the test partition
        #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
        test_size: f64,

        /// Seed for the train/test shuffle
        #[arg(long, default_value_t = DEFAULT_RANDOM_STATE)]
        random_state: u64,

        /// Print the summary as JSON to stdout (disables logging)
        #[arg(long)]
        json: bool,
    },

    /// Clean then preprocess, laying outputs out under a working directory
    Run {
        /// Raw CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Working directory for data/, reports/ and models/
        #[arg(short, long)]
        workdir: PathBuf,

        /// JSON pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the summary as JSON to stdout (disables logging)
        #[arg(long)]
        json: bool,
    },

    /// Apply a saved transform to a new feature file
    Apply {
        /// Saved transform (preprocessor.bin)
        #[arg(short, long)]
        preprocessor: PathBuf,

        /// CSV file with the fitted feature columns
        #[arg(short, long)]
        input: PathBuf,

        /// Transformed CSV destination
        #[arg(short, long)]
        output: PathBuf,

        /// Column copied through unchanged, e.g. the target
        #[arg(long)]
        passthrough: Option<String>,
    },

    /// Compare one column's distribution before and after cleaning
    Compare {
        /// Raw CSV file
        #[arg(long)]
        original: PathBuf,

        /// Cleaned CSV file
        #[arg(long)]
        cleaned: PathBuf,

        /// Column to summarize
        #[arg(long, default_value = DEFAULT_TARGET_COLUMN)]
        column: String,

        /// Write the comparison as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

impl Command {
    fn json_output(&self) -> bool {
        match self {
            Self::Clean { json, .. } | Self::Preprocess { json, .. } | Self::Run { json, .. } => {
                *json
            }
            Self::Apply { .. } | Self::Compare { .. } => false,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet, cli.command.json_output());

    match cli.command {
        Command::Clean {
            input,
            output,
            log,
            low_quantile,
            high_quantile,
            keep_duplicates,
            json,
        } => {
            let cleaning = CleaningConfig::builder()
                .low_quantile(low_quantile)
                .high_quantile(high_quantile)
                .drop_exact_duplicates(!keep_duplicates)
                .build()?;
            let pipeline = Pipeline::builder().cleaning(cleaning).build()?;
            let summary = pipeline
                .clean(&input, &output, &log)
                .context("Cleaning failed")?;
            emit(&summary, json, print_cleaning_summary)
        }
        Command::Preprocess {
            input,
            output_dir,
            models_dir,
            target,
            drop_columns,
            test_size,
            random_state,
            json,
        } => {
            let drop_columns = if drop_columns.is_empty() {
                default_drop_columns()
            } else {
                drop_columns
            };
            let preprocessing = PreprocessConfig::builder()
                .drop_columns(drop_columns)
                .target_column(target)
                .test_size(test_size)
                .random_state(random_state)
                .build()?;
            let pipeline = Pipeline::builder().preprocessing(preprocessing).build()?;
            let summary = pipeline
                .preprocess(&input, &output_dir, &models_dir)
                .context("Preprocessing failed")?;
            emit(&summary, json, print_preprocess_summary)
        }
        Command::Run {
            input,
            workdir,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => {
                    info!("Loading configuration from: {}", path.display());
                    PipelineConfig::from_json_file(&path)?
                }
                None => PipelineConfig::default(),
            };
            let pipeline = Pipeline::builder().config(config).build()?;
            let summary = pipeline.run(&input, &workdir).context("Run failed")?;
            info!("Outputs laid out under {:?}", RunLayout::under(&workdir));
            emit(&summary, json, |s: &RunSummary| {
                print_cleaning_summary(&s.cleaning);
                print_preprocess_summary(&s.preprocessing);
            })
        }
        Command::Apply {
            preprocessor,
            input,
            output,
            passthrough,
        } => {
            let summary = apply_transform(&preprocessor, &input, &output, passthrough.as_deref())
                .context("Apply failed")?;
            print_apply_summary(&summary);
            Ok(())
        }
        Command::Compare {
            original,
            cleaned,
            column,
            report,
        } => {
            let comparison = DistributionComparison::from_files(
                &original,
                &cleaned,
                &column,
                DEFAULT_LOW_QUANTILE,
                DEFAULT_HIGH_QUANTILE,
            )
            .context("Comparison failed")?;
            if let Some(path) = report {
                comparison.write_json(&path)?;
            }
            print!("{}", comparison);
            Ok(())
        }
    }
}

/// Print a summary as pretty JSON when requested, else in readable form.
///
/// Uses `println!` intentionally: the summary is the command's output and
/// must be visible regardless of log level.
fn emit<T: Serialize>(summary: &T, json: bool, human: impl Fn(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        human(summary);
    }
    Ok(())
}

fn print_cleaning_summary(summary: &CleaningSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!("Input:  {} ({})", summary.input_path.display(), summary.initial_shape);
    println!("Output: {} ({})", summary.output_path.display(), summary.final_shape);
    println!("Log:    {}", summary.log_path.display());
    println!();
    println!(
        "  Duplicates: {} found, {} dropped",
        summary.initial_duplicates, summary.rows_dropped_dupes
    );
    println!(
        "  Outliers dropped: {} (selling_price [{}, {}], km_driven [{}, {}])",
        summary.rows_dropped_outliers,
        summary.selling_price_bounds.low,
        summary.selling_price_bounds.high,
        summary.km_driven_bounds.low,
        summary.km_driven_bounds.high
    );
    if summary.malformed_values > 0 {
        println!("  Malformed numeric values: {}", summary.malformed_values);
    }
    match summary.baseline_year {
        Some(year) => println!("  Baseline year: {}", year),
        None => println!("  Baseline year: undefined"),
    }
    println!();
    println!("Preview (first rows):");
    for row in &summary.preview {
        println!("  {}", serde_json::Value::Object(row.clone()));
    }
    println!("{}", "=".repeat(80));
}

fn print_preprocess_summary(summary: &PreprocessSummary) {
    println!();
    println!("{}", "=".repeat(80));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!("Train: {} (X {}, y {})", summary.train_path.display(), summary.x_train_shape, summary.y_train_len);
    println!("Test:  {} (X {}, y {})", summary.test_path.display(), summary.x_test_shape, summary.y_test_len);
    println!();
    println!("  Dropped columns:     {:?}", summary.dropped_columns);
    println!("  Numeric columns:     {:?}", summary.numeric_columns);
    println!("  Categorical columns: {:?}", summary.categorical_columns);
    match &summary.preprocessor_path {
        Some(path) => println!("  Preprocessor saved:  {}", path.display()),
        None => println!("  Preprocessor saved:  no (no feature columns)"),
    }
    println!("{}", "=".repeat(80));
}

fn print_apply_summary(summary: &ApplySummary) {
    println!(
        "Transformed {} -> {} ({})",
        summary.input_path.display(),
        summary.output_path.display(),
        summary.output_shape
    );
    if summary.unknown_categories > 0 {
        println!(
            "  {} categorical values were unseen during fitting and encoded as zeros",
            summary.unknown_categories
        );
    }
}
