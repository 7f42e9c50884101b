//! Numeric coercion for text columns.

use crate::utils::{is_numeric_dtype, parse_numeric_string};
use polars::prelude::*;

/// Result of coercing one column.
#[derive(Debug)]
pub struct Coerced {
    pub series: Series,
    /// Non-empty values that could not be parsed and became missing.
    pub malformed: usize,
}

/// Parse a column into numbers.
///
/// Text is stripped of thousands separators and surrounding whitespace;
/// anything unparseable becomes missing. Columns that are already numeric
/// keep their values, except `NaN` and infinities, which become missing
/// and are not counted as malformed. The result is Int64 when every value is present and
/// integral, Float64 otherwise.
pub(crate) fn coerce_to_numeric(series: &Series) -> PolarsResult<Coerced> {
    let mut malformed = 0usize;

    let values: Vec<Option<f64>> = if is_numeric_dtype(series.dtype()) {
        let floats = series.cast(&DataType::Float64)?;
        floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect()
    } else {
        let text = series.cast(&DataType::String)?;
        text.str()?
            .into_iter()
            .map(|opt| {
                opt.and_then(|raw| {
                    let parsed = parse_numeric_string(raw);
                    if parsed.is_none() && !raw.trim().is_empty() {
                        malformed += 1;
                    }
                    parsed
                })
            })
            .collect()
    };

    Ok(Coerced {
        series: numeric_series(series.name().clone(), values),
        malformed,
    })
}

/// Build an Int64 series when all values are present and integral, else
/// Float64.
pub(crate) fn numeric_series(name: PlSmallStr, values: Vec<Option<f64>>) -> Series {
    let all_integral = values.iter().all(|v| match v {
        Some(x) => x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64,
        None => false,
    });

    if all_integral {
        let ints: Vec<i64> = values.iter().map(|v| v.unwrap_or_default() as i64).collect();
        Series::new(name, ints)
    } else {
        Series::new(name, values)
    }
}

/// Non-missing numeric values of a series, in row order.
pub(crate) fn present_values(series: &Series) -> PolarsResult<Vec<f64>> {
    let coerced = coerce_to_numeric(series)?;
    let floats = coerced.series.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_separators_become_integers() {
        let series = Series::new("selling_price".into(), &["1,20,000", " 45000 ", "3,50,000"]);
        let coerced = coerce_to_numeric(&series).unwrap();

        assert_eq!(coerced.series.dtype(), &DataType::Int64);
        assert_eq!(coerced.malformed, 0);
        let values: Vec<Option<i64>> = coerced.series.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(120000), Some(45000), Some(350000)]);
    }

    #[test]
    fn test_malformed_text_becomes_missing_float() {
        let series = Series::new(
            "km_driven".into(),
            &[Some("70000"), Some("unknown"), None, Some("")],
        );
        let coerced = coerce_to_numeric(&series).unwrap();

        assert_eq!(coerced.series.dtype(), &DataType::Float64);
        assert_eq!(coerced.malformed, 1);
        assert_eq!(coerced.series.null_count(), 3);
    }

    #[test]
    fn test_fractional_values_stay_float() {
        let series = Series::new("price".into(), &["1.5", "2"]);
        let coerced = coerce_to_numeric(&series).unwrap();
        assert_eq!(coerced.series.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_numeric_column_is_kept() {
        let series = Series::new("year".into(), &[2014i64, 2019, 2007]);
        let coerced = coerce_to_numeric(&series).unwrap();
        assert_eq!(coerced.series.dtype(), &DataType::Int64);
        assert_eq!(coerced.series.i64().unwrap().get(1), Some(2019));
    }

    #[test]
    fn test_present_values_skips_missing() {
        let series = Series::new("km".into(), &[Some("1,000"), None, Some("x"), Some("5")]);
        assert_eq!(present_values(&series).unwrap(), vec![1000.0, 5.0]);
    }

    #[test]
    fn test_nan_in_float_column_becomes_missing() {
        let series = Series::new(
            "km_driven".into(),
            &[Some(10000.0f64), Some(f64::NAN), None, Some(f64::INFINITY), Some(20000.0)],
        );
        let coerced = coerce_to_numeric(&series).unwrap();

        assert_eq!(coerced.malformed, 0);
        assert_eq!(coerced.series.null_count(), 3);
        assert_eq!(present_values(&series).unwrap(), vec![10000.0, 20000.0]);
    }
}
