//! Error types for DataFrame and SQL helpers

use dalgo_common::CommonError;
use dalgo_core::RddError;
use datafusion::error::DataFusionError;
use thiserror::Error;

/// Error types for SQL operations
#[derive(Error, Debug, Clone)]
pub enum SqlError {
    #[error("DataFusion error: {0}")]
    DataFusion(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("RDD integration error: {0}")]
    RddIntegration(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for SQL operations
pub type SqlResult<T> = Result<T, SqlError>;

impl From<DataFusionError> for SqlError {
    fn from(err: DataFusionError) -> Self {
        SqlError::DataFusion(err.to_string())
    }
}

impl From<datafusion::arrow::error::ArrowError> for SqlError {
    fn from(err: datafusion::arrow::error::ArrowError) -> Self {
        SqlError::DataFusion(err.to_string())
    }
}

impl From<RddError> for SqlError {
    fn from(err: RddError) -> Self {
        match err {
            RddError::IoError(msg) => SqlError::Io(msg),
            other => SqlError::RddIntegration(other.to_string()),
        }
    }
}

impl From<CommonError> for SqlError {
    fn from(err: CommonError) -> Self {
        SqlError::DataSource(err.to_string())
    }
}

impl From<std::io::Error> for SqlError {
    fn from(err: std::io::Error) -> Self {
        SqlError::Io(err.to_string())
    }
}

impl From<SqlError> for RddError {
    fn from(err: SqlError) -> Self {
        match err {
            SqlError::Io(msg) => RddError::IoError(msg),
            other => RddError::ComputationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_error_conversion() {
        let rdd_err: RddError = SqlError::Schema("test error".to_string()).into();
        match rdd_err {
            RddError::ComputationError(msg) => assert!(msg.contains("test error")),
            other => panic!("Expected ComputationError, got {other:?}"),
        }
    }

    #[test]
    fn test_io_errors_stay_io() {
        let sql_err: SqlError = RddError::IoError("missing.csv".to_string()).into();
        assert!(matches!(sql_err, SqlError::Io(msg) if msg == "missing.csv"));
    }
}
