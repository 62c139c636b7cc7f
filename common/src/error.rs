//! Error handling for the dalgo-common crate.

use thiserror::Error;

/// Common error type shared by the configuration, logging and loading helpers.
///
/// Every variant carries a human readable message and an optional source so
/// callers can keep the underlying library error in the chain.
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO operation failed: {message}")]
    IoError {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Invalid configuration: {message}")]
    ConfigurationError {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Parse failed: {message}")]
    ParseError {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Resource not found: {message}")]
    NotFoundError {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Result type alias for common operations.
pub type Result<T> = std::result::Result<T, CommonError>;

/// Error category for grouping related error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// File system and input errors
    Infrastructure,
    /// Malformed input data
    DataProcessing,
    /// Configuration and setup errors
    Configuration,
    /// Missing files or directories
    Resource,
    /// Internal logic errors
    Internal,
}

/// Diagnostics shared by the error types of the workspace.
pub trait Diagnose {
    /// Get the error category.
    fn category(&self) -> ErrorCategory;

    /// Check if the error is retryable.
    fn is_retryable(&self) -> bool;
}

impl CommonError {
    /// Create an IO error with a custom message.
    pub fn io_error<S: Into<String>>(message: S) -> Self {
        Self::IoError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an IO error with a custom message and source error.
    pub fn io_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::IoError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a configuration error with a custom message.
    pub fn configuration_error<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a custom message and source error.
    pub fn configuration_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a parse error with a custom message.
    pub fn parse_error<S: Into<String>>(message: S) -> Self {
        Self::ParseError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a parse error with a custom message and source error.
    pub fn parse_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::ParseError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a not found error with a custom message.
    pub fn not_found_error<S: Into<String>>(message: S) -> Self {
        Self::NotFoundError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        Self::InternalError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an internal error with a custom message and source error.
    pub fn internal_error_with_source<S: Into<String>, E: Into<anyhow::Error>>(
        message: S,
        source: E,
    ) -> Self {
        Self::InternalError {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl Diagnose for CommonError {
    fn category(&self) -> ErrorCategory {
        match self {
            CommonError::IoError { .. } => ErrorCategory::Infrastructure,
            CommonError::ConfigurationError { .. } => ErrorCategory::Configuration,
            CommonError::ParseError { .. } => ErrorCategory::DataProcessing,
            CommonError::NotFoundError { .. } => ErrorCategory::Resource,
            CommonError::InternalError { .. } => ErrorCategory::Internal,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, CommonError::IoError { .. })
    }
}

impl From<std::io::Error> for CommonError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CommonError::NotFoundError {
                message: err.to_string(),
                source: Some(err.into()),
            }
        } else {
            CommonError::io_error_with_source("I/O operation failed", err)
        }
    }
}

impl From<csv::Error> for CommonError {
    fn from(err: csv::Error) -> Self {
        CommonError::parse_error_with_source("Malformed CSV input", err)
    }
}

/// Context helpers for adding rich context to errors.
pub mod context {
    use super::*;

    /// Extension trait for adding context to Results.
    pub trait ErrorContext<T> {
        /// Wrap the error as an I/O error described by `f`.
        fn with_io_context<F>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> String;

        /// Wrap the error as a parse error described by `f`.
        fn with_parse_context<F>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> String;
    }

    impl<T, E> ErrorContext<T> for std::result::Result<T, E>
    where
        E: Into<anyhow::Error>,
    {
        fn with_io_context<F>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> String,
        {
            self.map_err(|e| CommonError::io_error_with_source(f(), e.into()))
        }

        fn with_parse_context<F>(self, f: F) -> Result<T>
        where
            F: FnOnce() -> String,
        {
            self.map_err(|e| CommonError::parse_error_with_source(f(), e.into()))
        }
    }
}

pub use context::ErrorContext;
