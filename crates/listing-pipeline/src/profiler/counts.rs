//! Value counts over categorical and integer columns.

use crate::utils::{integer_values, is_integer_dtype, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occurrences of one distinct value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
    /// Count divided by the number of non-null values.
    pub share: f64,
}

fn with_shares(counts: Vec<(String, usize)>) -> Vec<ValueCount> {
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            share: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64
            },
            value,
            count,
        })
        .collect()
}

/// Counts of each distinct non-null value, ordered by value.
///
/// Integer columns are ordered numerically, everything else lexically.
pub fn value_counts_by_value(series: &Series) -> PolarsResult<Vec<ValueCount>> {
    let counts: Vec<(String, usize)> = if is_integer_dtype(series.dtype()) {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        for value in integer_values(series)? {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(value, count)| (value.to_string(), count))
            .collect()
    } else {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for value in text_values(series)?.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts.into_iter().collect()
    };

    Ok(with_shares(counts))
}

/// Counts of each distinct non-null value, most frequent first.
///
/// Ties keep value order.
pub fn value_counts(series: &Series) -> PolarsResult<Vec<ValueCount>> {
    let mut counts = value_counts_by_value(series)?;
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pairs(counts: &[ValueCount]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.value.as_str(), c.count)).collect()
    }

    #[test]
    fn test_value_counts_most_frequent_first() {
        let series = Series::new(
            "brand".into(),
            &[Some("bmw"), Some("volkswagen"), None, Some("volkswagen"), Some("audi")],
        );
        let counts = value_counts(&series).unwrap();

        assert_eq!(pairs(&counts), vec![("volkswagen", 2), ("audi", 1), ("bmw", 1)]);
        assert!((counts[0].share - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_value_counts_by_value_is_numeric_for_integers() {
        let series = Series::new("registration_year".into(), &[2004i64, 999, 2004, 10_000]);
        let counts = value_counts_by_value(&series).unwrap();

        assert_eq!(pairs(&counts), vec![("999", 1), ("2004", 2), ("10000", 1)]);
    }

    #[test]
    fn test_single_dominant_value() {
        let series = Series::new("nr_of_pictures".into(), &["0", "0", "0"]);
        let counts = value_counts(&series).unwrap();

        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].share, 1.0);
    }

    #[test]
    fn test_empty_series() {
        let series = Series::new("price".into(), Vec::<i64>::new());
        assert!(value_counts(&series).unwrap().is_empty());
    }
}
