//! Error types for feature transformers.

use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MlError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column '{column}' has type {actual}, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unseen label '{label}' in column '{column}'")]
    UnseenLabel { column: String, label: String },

    #[error("Value {value} in column '{column}' is outside the bucket range [{lower}, {upper}]")]
    OutOfRange {
        column: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

/// Result type for feature operations
pub type MlResult<T> = Result<T, MlError>;
