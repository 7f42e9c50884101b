//! Shared utilities for the cleaning and preprocessing stages.
//!
//! Dtype classification, numeric text parsing and `AnyValue` conversions
//! used by more than one module live here.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Column Utilities
// =============================================================================

/// Owned column names of a DataFrame, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// Check whether a DataFrame has a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names()
        .into_iter()
        .any(|col| col.as_str() == name)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Thousands separator stripped from numeric text before parsing.
pub const THOUSANDS_SEPARATOR: char = ',';

/// Clean a string for numeric parsing: trim whitespace and drop thousands
/// separators.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_prep::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string(" 1,20,000 "), "120000");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    s.trim().replace(THOUSANDS_SEPARATOR, "").trim().to_string()
}

/// Try to parse a string as a numeric value (f64).
///
/// Returns `None` for empty text and for anything `f64::from_str` rejects
/// after cleaning. `NaN` and infinite spellings are treated as missing.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a float the way the cleaning log prints it: shortest round-trip
/// digits, with `.0` kept on integral values.
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

// =============================================================================
// AnyValue Conversions
// =============================================================================

/// Convert a cell into a JSON value for record previews.
pub fn any_value_to_json(value: &AnyValue<'_>) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::String((*s).to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        AnyValue::Float32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}

/// Convert the first `limit` rows of a DataFrame into JSON records keyed by
/// column name.
pub fn preview_records(
    df: &DataFrame,
    limit: usize,
) -> PolarsResult<Vec<serde_json::Map<String, serde_json::Value>>> {
    let head = df.head(Some(limit));
    let mut records = Vec::with_capacity(head.height());

    for row_idx in 0..head.height() {
        let mut record = serde_json::Map::new();
        for column in head.get_columns() {
            let value = column.get(row_idx)?;
            record.insert(column.name().to_string(), any_value_to_json(&value));
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("1,20,000"), "120000");
        assert_eq!(clean_numeric_string("  45000  "), "45000");
        assert_eq!(clean_numeric_string(" 1,000 "), "1000");
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("1,20,000"), Some(120000.0));
        assert_eq!(parse_numeric_string("2014"), Some(2014.0));
        assert_eq!(parse_numeric_string("3.5"), Some(3.5));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("   "), None);
        assert_eq!(parse_numeric_string("n/a"), None);
        assert_eq!(parse_numeric_string("NaN"), None);
        assert_eq!(parse_numeric_string("inf"), None);
        assert_eq!(parse_numeric_string("12 lakh"), None);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(45000.0), "45000.0");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(99.5), "99.5");
        assert_eq!(format_float(1234.25), "1234.25");
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Float32), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
        assert_eq!(get_dtype_category(&DataType::Boolean), DtypeCategory::Boolean);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
    }

    #[test]
    fn test_preview_records() {
        let df = df![
            "name" => ["Maruti Swift", "Honda City", "Hyundai i20"],
            "km_driven" => [Some(1000i64), None, Some(3000)],
        ]
        .unwrap();

        let records = preview_records(&df, 2).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], serde_json::json!("Maruti Swift"));
        assert_eq!(records[0]["km_driven"], serde_json::json!(1000));
        assert_eq!(records[1]["km_driven"], serde_json::Value::Null);
    }

    #[test]
    fn test_has_column() {
        let df = df!["year" => [2014i64]].unwrap();
        assert!(has_column(&df, "year"));
        assert!(!has_column(&df, "name"));
        assert_eq!(column_names(&df), vec!["year".to_string()]);
    }
}
