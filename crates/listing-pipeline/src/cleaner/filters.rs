//! Inclusive range filters over integer columns.

use crate::cleaner::columns::has_column;
use crate::config::RangeBounds;
use crate::error::{PipelineError, Result};
use crate::utils::is_integer_dtype;
use polars::prelude::*;
use tracing::debug;

fn integer_values<'a>(df: &'a DataFrame, column: &str) -> Result<&'a Series> {
    if !has_column(df, column) {
        return Err(PipelineError::ColumnNotFound(column.to_string()));
    }
    let series = df.column(column)?.as_materialized_series();
    if !is_integer_dtype(series.dtype()) {
        return Err(PipelineError::InvalidConfig(format!(
            "column '{}' holds {} values, range filters need integers",
            column,
            series.dtype()
        )));
    }
    Ok(series)
}

/// Keep only rows whose `column` value lies within `bounds` (inclusive).
///
/// Rows keep their relative order. Null values never qualify. Removing
/// every row is not an error.
pub fn filter_range(df: DataFrame, column: &str, bounds: RangeBounds) -> Result<DataFrame> {
    let series = integer_values(&df, column)?.cast(&DataType::Int64)?;
    let values = series.i64()?;

    let mask_values: Vec<bool> = values
        .into_iter()
        .map(|v| v.is_some_and(|val| bounds.contains(val)))
        .collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask_values);

    let filtered = df.filter(&mask)?;
    debug!(
        "Range filter {} in [{}]: kept {} of {} rows",
        column,
        bounds,
        filtered.height(),
        df.height()
    );
    Ok(filtered)
}

/// Fraction of non-null values in `column` that fall outside `bounds`.
///
/// Returns 0.0 for a table without non-null values.
pub fn share_outside_range(df: &DataFrame, column: &str, bounds: RangeBounds) -> Result<f64> {
    let series = integer_values(df, column)?.cast(&DataType::Int64)?;
    let values = series.i64()?;

    let (outside, total) = values
        .into_iter()
        .flatten()
        .fold((0usize, 0usize), |(outside, total), val| {
            (outside + usize::from(!bounds.contains(val)), total + 1)
        });

    if total == 0 {
        Ok(0.0)
    } else {
        Ok(outside as f64 / total as f64)
    }
}
