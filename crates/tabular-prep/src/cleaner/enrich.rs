//! Derived columns: `brand`, `model` and `age`.

use crate::utils::has_column;
use chrono::{Datelike, Local};
use polars::prelude::*;
use tracing::debug;

/// Split a free-text vehicle name into brand (first token) and model
/// (remaining tokens joined by a single space).
pub fn split_name(name: &str) -> (Option<String>, String) {
    let mut tokens = name.split_whitespace();
    let brand = tokens.next().map(str::to_string);
    let model = tokens.collect::<Vec<_>>().join(" ");
    (brand, model)
}

/// Replace `name` with `series` in place when present, else append it.
fn put_column(df: &mut DataFrame, series: Series) -> PolarsResult<()> {
    let name = series.name().to_string();
    if has_column(df, &name) {
        df.replace(&name, series)?;
    } else {
        df.with_column(series)?;
    }
    Ok(())
}

/// Derive `brand` and `model` from `name`. Missing names are treated as
/// empty. Does nothing when the frame has no `name` column.
pub fn derive_brand_model(df: &mut DataFrame) -> PolarsResult<bool> {
    if !has_column(df, "name") {
        debug!("No 'name' column; skipping brand/model derivation");
        return Ok(false);
    }

    let names = df.column("name")?.as_materialized_series().cast(&DataType::String)?;
    let names = names.str()?;

    let mut filled = Vec::with_capacity(names.len());
    let mut brands = Vec::with_capacity(names.len());
    let mut models = Vec::with_capacity(names.len());
    for opt in names.into_iter() {
        let text = opt.unwrap_or("");
        let (brand, model) = split_name(text);
        filled.push(text.to_string());
        brands.push(brand);
        models.push(model);
    }

    put_column(df, Series::new("name".into(), filled))?;
    put_column(df, Series::new("brand".into(), brands))?;
    put_column(df, Series::new("model".into(), models))?;
    Ok(true)
}

/// Derive `age = max_year - year` and return the baseline year.
///
/// The baseline is the largest `year` left in the frame, or the current
/// calendar year when none remain. Missing ages become 0. Returns `None`
/// without touching the frame when there is no `year` column.
pub fn derive_age(df: &mut DataFrame) -> PolarsResult<Option<i64>> {
    if !has_column(df, "year") {
        debug!("No 'year' column; baseline year is undefined");
        return Ok(None);
    }

    let years = df.column("year")?.as_materialized_series().cast(&DataType::Float64)?;
    let years = years.f64()?;

    let baseline = years
        .into_iter()
        .flatten()
        .fold(None, |acc: Option<f64>, y| Some(acc.map_or(y, |m| m.max(y))))
        .map(|m| m as i64)
        .unwrap_or_else(|| i64::from(Local::now().year()));

    let ages: Vec<i64> = years
        .into_iter()
        .map(|opt| opt.map(|y| (baseline as f64 - y) as i64).unwrap_or(0))
        .collect();

    put_column(df, Series::new("age".into(), ages))?;
    Ok(Some(baseline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("Maruti Swift Dzire VDI"),
            (Some("Maruti".to_string()), "Swift Dzire VDI".to_string())
        );
        assert_eq!(split_name("Tata"), (Some("Tata".to_string()), String::new()));
        assert_eq!(
            split_name("  Honda   City  2017 "),
            (Some("Honda".to_string()), "City 2017".to_string())
        );
        assert_eq!(split_name("   "), (None, String::new()));
    }

    #[test]
    fn test_derive_brand_model_appends_columns() {
        let mut df = df![
            "name" => [Some("Maruti 800 AC"), None, Some("Hyundai Verna 1.6 SX")],
            "year" => [2007i64, 2012, 2012],
        ]
        .unwrap();

        assert!(derive_brand_model(&mut df).unwrap());
        let names: Vec<_> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["name", "year", "brand", "model"]);

        let brand = df.column("brand").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(brand.get(0), Some("Maruti"));
        assert_eq!(brand.get(1), None);
        assert_eq!(brand.get(2), Some("Hyundai"));

        let model = df.column("model").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(model.get(1), Some(""));
        assert_eq!(model.get(2), Some("Verna 1.6 SX"));

        let name = df.column("name").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(name.get(1), Some(""));
    }

    #[test]
    fn test_derive_brand_model_replaces_existing_in_place() {
        let mut df = df![
            "model" => ["old"],
            "name" => ["Honda City"],
        ]
        .unwrap();

        derive_brand_model(&mut df).unwrap();
        let names: Vec<_> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["model", "name", "brand"]);
        assert_eq!(df.column("model").unwrap().as_materialized_series().str().unwrap().get(0), Some("City"));
    }

    #[test]
    fn test_derive_age_uses_max_year() {
        let mut df = df!["year" => [Some(2007.0f64), None, Some(2020.0)]].unwrap();

        let baseline = derive_age(&mut df).unwrap();
        assert_eq!(baseline, Some(2020));

        let ages: Vec<Option<i64>> = df.column("age").unwrap().as_materialized_series().i64().unwrap().into_iter().collect();
        assert_eq!(ages, vec![Some(13), Some(0), Some(0)]);
    }

    #[test]
    fn test_derive_age_without_year_column() {
        let mut df = df!["name" => ["Honda City"]].unwrap();
        assert_eq!(derive_age(&mut df).unwrap(), None);
        assert!(!has_column(&df, "age"));
    }

    #[test]
    fn test_derive_age_all_missing_uses_current_year() {
        let mut df = df!["year" => [None::<i64>, None]].unwrap();
        let baseline = derive_age(&mut df).unwrap();
        assert_eq!(baseline, Some(i64::from(Local::now().year())));
        let ages: Vec<Option<i64>> = df.column("age").unwrap().as_materialized_series().i64().unwrap().into_iter().collect();
        assert_eq!(ages, vec![Some(0), Some(0)]);
    }
}
