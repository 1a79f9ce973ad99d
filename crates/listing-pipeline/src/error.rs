//! Error types for the listing pipeline.
//!
//! Every failure is fatal: a stage either completes or the whole run is
//! aborted with one of these errors. Errors carry enough detail to name the
//! offending column, row, or value in the diagnostic message.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the listing pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input file is missing or unreadable.
    #[error("Cannot read input file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input bytes are not valid under the declared encoding.
    #[error("Input is not valid {encoding} text")]
    Decode { encoding: &'static str },

    /// Number of column names does not match the table width.
    #[error("Schema mismatch: expected {expected} columns, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// A source header does not match the expected header at its position.
    #[error("Header mismatch at column {position}: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A value could not be parsed as an integer after cleaning.
    ///
    /// `row` is the 0-based index among data rows; the message counts from 1.
    #[error("Cannot parse '{value}' in column '{column}' (data row {}) as an integer", .row + 1)]
    NumericParse {
        column: String,
        row: usize,
        value: String,
    },

    /// A category had no rows to average over.
    #[error("No rows with {category_column} = '{category}' to average {target_column} over")]
    EmptyGroup {
        category_column: String,
        category: String,
        target_column: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report assembly failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error annotated with the stage it happened in.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code; context wrappers report the code of the wrapped error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileAccess { .. } => "FILE_ACCESS",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::SchemaMismatch { .. } | Self::HeaderMismatch { .. } => "SCHEMA_MISMATCH",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::NumericParse { .. } => "NUMERIC_PARSE_ERROR",
            Self::EmptyGroup { .. } => "EMPTY_GROUP",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Strip any context wrappers and return the underlying error.
    pub fn root(&self) -> &PipelineError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors are serialized as `{ code, message }`.
impl Serialize for PipelineError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PipelineError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PipelineError::ColumnNotFound("price".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PipelineError::SchemaMismatch {
                expected: 20,
                found: 19
            }
            .error_code(),
            "SCHEMA_MISMATCH"
        );
        assert_eq!(
            PipelineError::HeaderMismatch {
                position: 0,
                expected: "dateCrawled".to_string(),
                found: "date".to_string(),
            }
            .error_code(),
            "SCHEMA_MISMATCH"
        );
    }

    #[test]
    fn test_numeric_parse_message_names_value() {
        let error = PipelineError::NumericParse {
            column: "price".to_string(),
            row: 3,
            value: "$1.5k".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("price"));
        assert!(message.contains("$1.5k"));
        // first data row is row 1 in the message
        assert!(message.contains("data row 4"));
    }

    #[test]
    fn test_error_serialization() {
        let error = PipelineError::EmptyGroup {
            category_column: "brand".to_string(),
            category: "trabant".to_string(),
            target_column: "price".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("EMPTY_GROUP"));
        assert!(json.contains("trabant"));
    }

    #[test]
    fn test_with_context() {
        let error = PipelineError::ColumnNotFound("nr_of_pictures".to_string())
            .with_context("Pruning Columns");
        assert!(error.to_string().starts_with("Pruning Columns: "));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(matches!(error.root(), PipelineError::ColumnNotFound(_)));
    }
}
