//! Distribution of listings over calendar dates.

use crate::utils::{date_prefix, text_values};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket label for rows without a timestamp.
pub const MISSING_DATE: &str = "missing";

/// Share of rows falling on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateShare {
    pub date: String,
    pub count: usize,
    pub share: f64,
}

/// Per-date shares for one timestamp column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateDistribution {
    pub column: String,
    /// Ordered by date; the missing bucket sorts last.
    pub shares: Vec<DateShare>,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

/// Distribution of rows over the date prefix of a timestamp column.
///
/// Shares are relative to all rows, nulls included.
pub fn date_distribution(series: &Series) -> PolarsResult<DateDistribution> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;

    for value in text_values(series)? {
        let key = match value.as_deref() {
            Some(timestamp) => date_prefix(timestamp).to_string(),
            None => MISSING_DATE.to_string(),
        };
        *counts.entry(key).or_insert(0) += 1;
        total += 1;
    }

    let dates: Vec<NaiveDate> = counts
        .keys()
        .filter_map(|key| NaiveDate::parse_from_str(key, "%Y-%m-%d").ok())
        .collect();

    let shares = counts
        .into_iter()
        .map(|(date, count)| DateShare {
            date,
            count,
            share: count as f64 / total as f64,
        })
        .collect();

    Ok(DateDistribution {
        column: series.name().to_string(),
        shares,
        earliest: dates.iter().min().copied(),
        latest: dates.iter().max().copied(),
    })
}
