//! Column renaming and pruning.

use crate::config::ColumnMapping;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use tracing::debug;

/// Rename every column by position.
///
/// Labels are applied blindly: if the source file reorders its columns, the
/// new names silently describe the wrong data. Prefer
/// [`rename_columns_checked`] when the source headers are known.
///
/// # Errors
///
/// [`PipelineError::SchemaMismatch`] if `names` and the table differ in width.
pub fn rename_columns<S: AsRef<str>>(df: DataFrame, names: &[S]) -> Result<DataFrame> {
    if names.len() != df.width() {
        return Err(PipelineError::SchemaMismatch {
            expected: names.len(),
            found: df.width(),
        });
    }

    let columns: Vec<Column> = df
        .get_columns()
        .iter()
        .zip(names)
        .map(|(column, name)| column.clone().with_name(name.as_ref().into()))
        .collect();

    debug!("Renamed {} columns", columns.len());
    Ok(DataFrame::new(columns)?)
}

/// Rename columns after checking each source header against `mapping`.
///
/// # Errors
///
/// - [`PipelineError::SchemaMismatch`] if `mapping` and the table differ in width
/// - [`PipelineError::HeaderMismatch`] for the first header that differs from
///   the expected source header at its position
pub fn rename_columns_checked(df: DataFrame, mapping: &[ColumnMapping]) -> Result<DataFrame> {
    if mapping.len() != df.width() {
        return Err(PipelineError::SchemaMismatch {
            expected: mapping.len(),
            found: df.width(),
        });
    }

    for (position, (actual, expected)) in df.get_column_names().iter().zip(mapping).enumerate() {
        if actual.as_str() != expected.source {
            return Err(PipelineError::HeaderMismatch {
                position,
                expected: expected.source.clone(),
                found: actual.to_string(),
            });
        }
    }

    let names: Vec<&str> = mapping.iter().map(|m| m.target.as_str()).collect();
    rename_columns(df, &names)
}

/// Remove a single column.
///
/// # Errors
///
/// [`PipelineError::ColumnNotFound`] if the table has no such column.
pub fn drop_column(df: DataFrame, name: &str) -> Result<DataFrame> {
    if !has_column(&df, name) {
        return Err(PipelineError::ColumnNotFound(name.to_string()));
    }
    Ok(df.drop(name)?)
}

pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}
