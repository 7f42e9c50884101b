//! Standardization of numeric columns.

use crate::profiler::{mean, population_std};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Learned centering and scaling for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation, or 1.0 when it is zero.
    pub scale: f64,
}

/// Per-column `(x - mean) / scale` with parameters learned at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<ScaleParams>,
}

impl StandardScaler {
    /// Learn mean and population std of each column over its present,
    /// finite values.
    pub fn fit(df: &DataFrame, columns: &[String]) -> PolarsResult<Self> {
        let mut params = Vec::with_capacity(columns.len());

        for name in columns {
            let values = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
            let values: Vec<f64> = values
                .f64()?
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .collect();

            let center = mean(&values).unwrap_or(0.0);
            let std = population_std(&values, center);
            let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };

            debug!("Scaler '{}': mean={}, scale={}", name, center, scale);
            params.push(ScaleParams {
                column: name.clone(),
                mean: center,
                scale,
            });
        }

        Ok(Self { params })
    }

    pub fn params(&self) -> &[ScaleParams] {
        &self.params
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.column.as_str())
    }

    /// Standardize the fitted columns of `df`. Missing and `NaN` values
    /// come out missing.
    pub fn transform(&self, df: &DataFrame) -> PolarsResult<Vec<Series>> {
        let mut out = Vec::with_capacity(self.params.len());

        for p in &self.params {
            let values = df
                .column(&p.column)?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let scaled: Vec<Option<f64>> = values
                .f64()?
                .into_iter()
                .map(|opt| opt.filter(|v| !v.is_nan()).map(|v| (v - p.mean) / p.scale))
                .collect();
            out.push(Series::new(p.column.as_str().into(), scaled));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_population_std() {
        let df = df!["km_driven" => [2.0f64, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]].unwrap();
        let scaler = StandardScaler::fit(&df, &["km_driven".to_string()]).unwrap();

        assert_eq!(scaler.params()[0].mean, 5.0);
        assert_eq!(scaler.params()[0].scale, 2.0);
    }

    #[test]
    fn test_constant_column_scale_one() {
        let df = df!["seats" => [5i64, 5, 5]].unwrap();
        let scaler = StandardScaler::fit(&df, &["seats".to_string()]).unwrap();
        assert_eq!(scaler.params()[0].scale, 1.0);

        let out = scaler.transform(&df).unwrap();
        let values: Vec<Option<f64>> = out[0].f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_values_skipped_and_preserved() {
        let df = df!["age" => [Some(1.0f64), None, Some(3.0)]].unwrap();
        let scaler = StandardScaler::fit(&df, &["age".to_string()]).unwrap();
        assert_eq!(scaler.params()[0].mean, 2.0);

        let out = scaler.transform(&df).unwrap();
        let values: Vec<Option<f64>> = out[0].f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(-1.0), None, Some(1.0)]);
    }

    #[test]
    fn test_nan_ignored_during_fit() {
        let df = df!["km_driven" => [1.0f64, f64::NAN, 3.0]].unwrap();
        let scaler = StandardScaler::fit(&df, &["km_driven".to_string()]).unwrap();
        assert_eq!(scaler.params()[0].mean, 2.0);
        assert_eq!(scaler.params()[0].scale, 1.0);

        let out = scaler.transform(&df).unwrap();
        let values: Vec<Option<f64>> = out[0].f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(-1.0), None, Some(1.0)]);
    }
}
