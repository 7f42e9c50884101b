//! Row-level cleaning operations for the car-price dataset.
//!
//! This module provides functionality for:
//! - Counting and removing exact duplicate rows
//! - Coercing numeric-like text columns to numbers
//! - Deriving `brand`, `model` and `age`

mod converters;
pub mod enrich;

pub(crate) use converters::present_values;
pub use converters::Coerced;
pub use enrich::{derive_age, derive_brand_model, split_name};

use crate::utils::has_column;
use polars::prelude::*;
use tracing::{debug, warn};

/// Columns coerced to numbers during cleaning, when present.
pub const NUMERIC_COLUMNS: [&str; 3] = ["selling_price", "km_driven", "year"];

/// Data cleaner for duplicate removal and numeric coercion.
pub struct DataCleaner;

impl DataCleaner {
    /// Count rows that repeat an earlier row exactly.
    ///
    /// Rows are compared across all columns; missing values compare equal
    /// to each other.
    pub fn count_duplicates(df: &DataFrame) -> PolarsResult<usize> {
        Ok(df.height() - df.unique_stable(None, UniqueKeepStrategy::First, None)?.height())
    }

    /// Drop exact duplicate rows, keeping the first occurrence in original
    /// order. Returns the deduplicated frame and the number of rows removed.
    pub fn drop_duplicates(df: &DataFrame) -> PolarsResult<(DataFrame, usize)> {
        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = df.height() - deduped.height();
        if removed == 0 {
            debug!("No duplicate rows found");
        } else {
            debug!("Removed {} duplicate rows", removed);
        }
        Ok((deduped, removed))
    }

    /// Coerce each present column of [`NUMERIC_COLUMNS`] to numbers.
    ///
    /// Returns the total number of malformed values that became missing.
    pub fn coerce_numeric_columns(df: &mut DataFrame) -> PolarsResult<usize> {
        let mut malformed_total = 0;

        for name in NUMERIC_COLUMNS {
            if !has_column(df, name) {
                debug!("Column '{}' not present; skipping coercion", name);
                continue;
            }

            let coerced = converters::coerce_to_numeric(df.column(name)?.as_materialized_series())?;
            if coerced.malformed > 0 {
                warn!(
                    "Column '{}': {} malformed values set to missing",
                    name, coerced.malformed
                );
            }
            debug!("Column '{}' coerced to {}", name, coerced.series.dtype());
            malformed_total += coerced.malformed;
            df.replace(name, coerced.series)?;
        }

        Ok(malformed_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_duplicates_treats_missing_as_equal() {
        let df = df![
            "name" => [Some("Honda City"), Some("Honda City"), None, None, Some("Tata Nano")],
            "km_driven" => [Some(50000i64), Some(50000), None, None, Some(50000)],
        ]
        .unwrap();

        assert_eq!(DataCleaner::count_duplicates(&df).unwrap(), 2);
    }

    #[test]
    fn test_drop_duplicates_keeps_first_in_order() {
        let df = df![
            "name" => ["b", "a", "b", "c", "a"],
            "year" => [2010i64, 2011, 2010, 2012, 2011],
        ]
        .unwrap();

        let (deduped, removed) = DataCleaner::drop_duplicates(&df).unwrap();
        assert_eq!(removed, 2);
        let names: Vec<Option<&str>> = deduped
            .column("name")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(names, vec![Some("b"), Some("a"), Some("c")]);
    }

    #[test]
    fn test_rows_differing_in_one_column_are_kept() {
        let df = df![
            "name" => ["Honda City", "Honda City"],
            "year" => [2014i64, 2015],
        ]
        .unwrap();
        let (deduped, removed) = DataCleaner::drop_duplicates(&df).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(deduped.height(), 2);
    }

    #[test]
    fn test_coerce_numeric_columns() {
        let mut df = df![
            "name" => ["Honda City", "Tata Nano", "Maruti Alto"],
            "selling_price" => ["4,50,000", "1,20,000", "oops"],
            "km_driven" => ["70,000", "5000", "12000"],
        ]
        .unwrap();

        let malformed = DataCleaner::coerce_numeric_columns(&mut df).unwrap();
        assert_eq!(malformed, 1);
        assert_eq!(df.column("selling_price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("km_driven").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
    }
}
