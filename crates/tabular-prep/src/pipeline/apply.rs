//! Apply a persisted transform to a new feature file.

use crate::dataset::{load_csv, write_csv};
use crate::error::{PipelineError, Result};
use crate::transform::FittedTransform;
use crate::types::{ApplySummary, Shape};
use crate::utils::has_column;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Transform `df` with `fitted`, carrying `passthrough` unchanged as the
/// last column. Returns the frame and the unseen category count.
pub fn apply_frame(
    fitted: &FittedTransform,
    df: &DataFrame,
    passthrough: Option<&str>,
) -> Result<(DataFrame, usize)> {
    let carried = match passthrough {
        Some(name) if has_column(df, name) => Some(df.column(name)?.clone()),
        Some(name) => return Err(PipelineError::MissingColumn(name.to_string())),
        None => None,
    };

    let output = fitted.transform_with_stats(df)?;
    let mut frame = output.frame;
    if let Some(column) = carried {
        frame.with_column(column)?;
    }
    Ok((frame, output.unknown_categories))
}

/// Load the transform at `preprocessor`, apply it to `input` and write the
/// result to `output`.
pub fn apply_transform(
    preprocessor: &Path,
    input: &Path,
    output: &Path,
    passthrough: Option<&str>,
) -> Result<ApplySummary> {
    info!("Loading preprocessor from: {}", preprocessor.display());
    let fitted = FittedTransform::load(preprocessor)?;

    info!("Loading dataset from: {}", input.display());
    let df = load_csv(input)?;

    let (mut frame, unknown_categories) = apply_frame(&fitted, &df, passthrough)?;
    write_csv(&mut frame, output)?;
    info!("Transformed dataset saved: {}", output.display());

    Ok(ApplySummary {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        output_shape: Shape::of(&frame),
        unknown_categories,
        passthrough_column: passthrough.map(str::to_string),
    })
}
