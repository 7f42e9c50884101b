//! Indicator expansion of categorical columns.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Known categories of one column, in first-observed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryList {
    pub column: String,
    pub categories: Vec<String>,
}

impl CategoryList {
    /// Output column names, `<column>_<category>`.
    pub fn indicator_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|cat| format!("{}_{}", self.column, cat))
            .collect()
    }
}

/// Indicator columns produced by [`OneHotEncoder::transform`].
#[derive(Debug)]
pub struct Encoded {
    pub columns: Vec<Series>,
    /// Present values that matched no fitted category.
    pub unknown: usize,
}

/// One-hot encoder that ignores unknown categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    lists: Vec<CategoryList>,
}

/// Column cast to its text form; categories are compared as strings.
fn column_text(df: &DataFrame, name: &str) -> PolarsResult<Series> {
    df.column(name)?
        .as_materialized_series()
        .cast(&DataType::String)
}

impl OneHotEncoder {
    /// Learn the distinct present values of each column in first-observed
    /// order.
    pub fn fit(df: &DataFrame, columns: &[String]) -> PolarsResult<Self> {
        let mut lists = Vec::with_capacity(columns.len());

        for name in columns {
            let text = column_text(df, name)?;
            let mut seen = HashSet::new();
            let mut categories = Vec::new();
            for value in text.str()?.into_iter().flatten() {
                if seen.insert(value) {
                    categories.push(value.to_string());
                }
            }

            debug!("Encoder '{}': {} categories", name, categories.len());
            lists.push(CategoryList {
                column: name.clone(),
                categories,
            });
        }

        Ok(Self { lists })
    }

    pub fn category_lists(&self) -> &[CategoryList] {
        &self.lists
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|l| l.column.as_str())
    }

    /// Expand each fitted column into one Float64 indicator per category.
    /// Missing and unseen values produce all zeros.
    pub fn transform(&self, df: &DataFrame) -> PolarsResult<Encoded> {
        let mut columns = Vec::new();
        let mut unknown = 0;

        for list in &self.lists {
            let lookup: HashMap<&str, usize> = list
                .categories
                .iter()
                .enumerate()
                .map(|(idx, cat)| (cat.as_str(), idx))
                .collect();

            let text = column_text(df, &list.column)?;
            let mut unseen = 0;
            let positions: Vec<Option<usize>> = text
                .str()?
                .into_iter()
                .map(|opt| {
                    let value = opt?;
                    let pos = lookup.get(value).copied();
                    if pos.is_none() {
                        unseen += 1;
                    }
                    pos
                })
                .collect();
            if unseen > 0 {
                debug!("Column '{}': {} unseen categories encoded as zeros", list.column, unseen);
            }
            unknown += unseen;

            for (cat_idx, name) in list.indicator_names().into_iter().enumerate() {
                let flags: Vec<f64> = positions
                    .iter()
                    .map(|pos| if *pos == Some(cat_idx) { 1.0 } else { 0.0 })
                    .collect();
                columns.push(Series::new(name.into(), flags));
            }
        }

        Ok(Encoded { columns, unknown })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_first_observed_order() {
        let df = df!["fuel" => [Some("Petrol"), Some("Diesel"), None, Some("Petrol"), Some("CNG")]]
            .unwrap();
        let encoder = OneHotEncoder::fit(&df, &["fuel".to_string()]).unwrap();

        assert_eq!(
            encoder.category_lists()[0].categories,
            vec!["Petrol", "Diesel", "CNG"]
        );
        assert_eq!(
            encoder.category_lists()[0].indicator_names(),
            vec!["fuel_Petrol", "fuel_Diesel", "fuel_CNG"]
        );
    }

    #[test]
    fn test_unknown_and_missing_are_all_zero() {
        let train = df!["fuel" => ["Petrol", "Diesel"]].unwrap();
        let encoder = OneHotEncoder::fit(&train, &["fuel".to_string()]).unwrap();

        let test = df!["fuel" => [Some("Electric"), None, Some("Diesel")]].unwrap();
        let encoded = encoder.transform(&test).unwrap();

        assert_eq!(encoded.unknown, 1);
        assert_eq!(encoded.columns.len(), 2);
        let petrol: Vec<Option<f64>> = encoded.columns[0].f64().unwrap().into_iter().collect();
        let diesel: Vec<Option<f64>> = encoded.columns[1].f64().unwrap().into_iter().collect();
        assert_eq!(petrol, vec![Some(0.0), Some(0.0), Some(0.0)]);
        assert_eq!(diesel, vec![Some(0.0), Some(0.0), Some(1.0)]);
    }

    #[test]
    fn test_non_string_categories_use_text_form() {
        let df = df!["owner_flag" => [true, false, true]].unwrap();
        let encoder = OneHotEncoder::fit(&df, &["owner_flag".to_string()]).unwrap();
        assert_eq!(
            encoder.category_lists()[0].indicator_names(),
            vec!["owner_flag_true", "owner_flag_false"]
        );
    }

    #[test]
    fn test_integer_categories_match_by_text() {
        let train = df!["seats" => [5i64, 7, 5, 4]].unwrap();
        let encoder = OneHotEncoder::fit(&train, &["seats".to_string()]).unwrap();
        assert_eq!(encoder.category_lists()[0].categories, vec!["5", "7", "4"]);

        let test = df!["seats" => [Some(7i64), Some(8), None]].unwrap();
        let encoded = encoder.transform(&test).unwrap();
        assert_eq!(encoded.unknown, 1);
        let seven: Vec<Option<f64>> = encoded.columns[1].f64().unwrap().into_iter().collect();
        assert_eq!(seven, vec![Some(1.0), Some(0.0), Some(0.0)]);
    }
}
