//! Seeded train/test partitioning.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Row indices of each partition, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<IdxSize>,
    pub test: Vec<IdxSize>,
}

/// Number of test rows for `n` rows at `test_size`, rounded up.
pub fn test_count(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Shuffle `0..n` with a generator seeded from `random_state` and cut it
/// into a test partition (the first `ceil(test_size * n)` indices) and a
/// train partition (the rest).
///
/// # Errors
///
/// `EmptyInput` for `n == 0`, `InvalidSplit` when either partition would
/// be empty.
pub fn split_indices(n: usize, test_size: f64, random_state: u64) -> Result<SplitIndices> {
    if n == 0 {
        return Err(PipelineError::EmptyInput(
            "no rows to split into train and test".to_string(),
        ));
    }

    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::InvalidSplit(format!(
            "test_size={} over {} rows leaves {} test and {} train rows",
            test_size,
            n,
            n_test,
            n.saturating_sub(n_test)
        )));
    }

    let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
    let mut rng = StdRng::seed_from_u64(random_state);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    debug!("Split {} rows into {} train / {} test", n, train.len(), indices.len());
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

/// Split a frame into `(train, test)` rows per [`split_indices`].
pub fn train_test_split(
    df: &DataFrame,
    test_size: f64,
    random_state: u64,
) -> Result<(DataFrame, DataFrame)> {
    let split = split_indices(df.height(), test_size, random_state)?;
    let train = df.take(&IdxCa::from_vec("train_idx".into(), split.train))?;
    let test = df.take(&IdxCa::from_vec("test_idx".into(), split.test))?;
    Ok((train, test))
}
