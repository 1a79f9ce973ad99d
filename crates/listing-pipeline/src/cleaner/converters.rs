//! Coercion of formatted text columns into integers.

use crate::cleaner::columns::has_column;
use crate::config::NumericColumnSpec;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::debug;

/// Strip every occurrence of each literal in `strip`, then parse as base-10.
///
/// Values lacking the literals pass through the strip step unchanged and
/// parse only if they already are plain integers.
///
/// # Example
///
/// ```rust,ignore
/// use listing_pipeline::cleaner::clean_integer;
///
/// assert_eq!(clean_integer("$8,500", &["$", ","]), Some(8500));
/// assert_eq!(clean_integer("150,000km", &["km", ","]), Some(150000));
/// ```
pub fn clean_integer<S: AsRef<str>>(raw: &str, strip: &[S]) -> Option<i64> {
    let mut cleaned = raw.to_string();
    for literal in strip {
        let literal = literal.as_ref();
        if !literal.is_empty() {
            cleaned = cleaned.replace(literal, "");
        }
    }
    cleaned.trim().parse::<i64>().ok()
}

/// Replace a text column with its integer values.
///
/// # Errors
///
/// - [`PipelineError::ColumnNotFound`] if `spec.column` is absent
/// - [`PipelineError::NumericParse`] for the first missing or unparseable value;
///   no rows are skipped or recovered
pub fn coerce_integer_column(df: DataFrame, spec: &NumericColumnSpec) -> Result<DataFrame> {
    let mut df = df;
    if !has_column(&df, &spec.column) {
        return Err(PipelineError::ColumnNotFound(spec.column.clone()));
    }

    let series = df.column(&spec.column)?.as_materialized_series();
    let text = series.cast(&DataType::String)?;
    let str_series = text.str()?;
    let mut values: Vec<i64> = Vec::with_capacity(str_series.len());

    for (row, opt_val) in str_series.into_iter().enumerate() {
        let parsed = opt_val.and_then(|val| clean_integer(val, &spec.strip));
        match parsed {
            Some(value) => values.push(value),
            None => {
                return Err(PipelineError::NumericParse {
                    column: spec.column.clone(),
                    row,
                    value: opt_val.unwrap_or("<missing>").to_string(),
                });
            }
        }
    }

    let coerced = Series::new(spec.column.as_str().into(), values);
    df.replace(&spec.column, coerced)?;

    if let Some(ref new_name) = spec.rename_to {
        df.rename(&spec.column, new_name.as_str().into())?;
        debug!("Coerced '{}' to integers as '{}'", spec.column, new_name);
    } else {
        debug!("Coerced '{}' to integers", spec.column);
    }

    Ok(df)
}
