//! Shared helpers for working with listing columns.

use polars::prelude::*;

/// Number of leading characters of a timestamp that form its calendar date.
pub const DATE_PREFIX_LEN: usize = 10;

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
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
    )
}

/// Calendar-date prefix of an ISO-like timestamp (`"2016-03-26 17:47:46"` -> `"2016-03-26"`).
///
/// Shorter values are returned whole.
pub fn date_prefix(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(DATE_PREFIX_LEN) {
        Some((idx, _)) => &timestamp[..idx],
        None => timestamp,
    }
}

/// Non-null integer values of a Series, in row order.
pub fn integer_values(series: &Series) -> PolarsResult<Vec<i64>> {
    let casted = series.cast(&DataType::Int64)?;
    Ok(casted.i64()?.into_iter().flatten().collect())
}

/// Values of a Series rendered as text, `None` for nulls.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
