//! Descriptive statistics for integer columns.

use crate::utils::integer_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summary of an integer column, in the shape of a `describe()` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub count: usize,
    pub unique: usize,
    pub mean: f64,
    /// Sample standard deviation; 0.0 for fewer than two values.
    pub std: f64,
    pub min: i64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: i64,
}

/// Quantile of sorted values with linear interpolation between ranks.
fn quantile(sorted: &[i64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] as f64 + (sorted[upper] - sorted[lower]) as f64 * fraction
}

/// Describe the non-null values of an integer column.
///
/// Returns `None` when the column has no non-null values.
pub fn describe_integers(series: &Series) -> PolarsResult<Option<NumericSummary>> {
    let mut values = integer_values(series)?;
    if values.is_empty() {
        return Ok(None);
    }
    values.sort_unstable();

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let std = if values.len() > 1 {
        let variance = values
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    } else {
        0.0
    };
    let unique = values.iter().collect::<HashSet<_>>().len();

    Ok(Some(NumericSummary {
        count: values.len(),
        unique,
        mean,
        std,
        min: values[0],
        q25: quantile(&values, 0.25),
        median: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: values[values.len() - 1],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_integers() {
        let series = Series::new("odometer_km".into(), &[5_000i64, 150_000, 150_000, 70_000]);
        let summary = describe_integers(&series).unwrap().unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.unique, 3);
        assert_eq!(summary.min, 5_000);
        assert_eq!(summary.max, 150_000);
        assert!((summary.mean - 93_750.0).abs() < 1e-9);
        // sorted: 5000, 70000, 150000, 150000
        assert!((summary.q25 - 53_750.0).abs() < 1e-9);
        assert!((summary.median - 110_000.0).abs() < 1e-9);
        assert!((summary.q75 - 150_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_describe_single_value() {
        let series = Series::new("price".into(), &[42i64]);
        let summary = describe_integers(&series).unwrap().unwrap();

        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.median, 42.0);
    }

    #[test]
    fn test_describe_skips_nulls() {
        let series = Series::new("price".into(), &[Some(10i64), None, Some(20)]);
        let summary = describe_integers(&series).unwrap().unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, 15.0);
    }

    #[test]
    fn test_describe_empty() {
        let series = Series::new("price".into(), Vec::<i64>::new());
        assert!(describe_integers(&series).unwrap().is_none());
    }
}
