//! Per-category means over integer columns.

use crate::cleaner::has_column;
use crate::error::{PipelineError, Result};
use crate::utils::text_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mean of the target column for one category, truncated toward zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMean {
    pub category: String,
    pub mean: i64,
}

/// Category means in the order the categories were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupedMeans {
    entries: Vec<GroupMean>,
}

impl GroupedMeans {
    /// Mean for `category`, if it was requested.
    pub fn get(&self, category: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.mean)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupMean> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(category, mean)` pairs in insertion order.
    pub fn to_pairs(&self) -> Vec<(String, i64)> {
        self.entries
            .iter()
            .map(|entry| (entry.category.clone(), entry.mean))
            .collect()
    }
}

impl FromIterator<(String, i64)> for GroupedMeans {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(category, mean)| GroupMean { category, mean })
                .collect(),
        }
    }
}

/// Mean of `target_column` over the rows of each category in `categories`.
///
/// Null targets are skipped. Means are truncated, not rounded: 2999.9 becomes 2999.
///
/// # Errors
///
/// - [`PipelineError::ColumnNotFound`] if either column is absent
/// - [`PipelineError::EmptyGroup`] if a category has no rows with a target value
pub fn mean_by_category<S: AsRef<str>>(
    df: &DataFrame,
    category_column: &str,
    target_column: &str,
    categories: &[S],
) -> Result<GroupedMeans> {
    for column in [category_column, target_column] {
        if !has_column(df, column) {
            return Err(PipelineError::ColumnNotFound(column.to_string()));
        }
    }

    let groups = text_values(df.column(category_column)?.as_materialized_series())?;
    let targets = df
        .column(target_column)?
        .as_materialized_series()
        .cast(&DataType::Int64)?;
    let targets = targets.i64()?;

    let mut means = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.as_ref();
        let (sum, count) = groups
            .iter()
            .zip(targets.into_iter())
            .filter(|(group, _)| group.as_deref() == Some(category))
            .filter_map(|(_, target)| target)
            .fold((0.0f64, 0usize), |(sum, count), value| {
                (sum + value as f64, count + 1)
            });

        if count == 0 {
            return Err(PipelineError::EmptyGroup {
                category_column: category_column.to_string(),
                category: category.to_string(),
                target_column: target_column.to_string(),
            });
        }

        let mean = (sum / count as f64).trunc() as i64;
        debug!(
            "Mean {} for {} = {}: {} over {} rows",
            target_column, category_column, category, mean, count
        );
        means.push((category.to_string(), mean));
    }

    Ok(means.into_iter().collect())
}
