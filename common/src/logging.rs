//! Process-wide tracing setup.
//!
//! The console only shows records at the session log level so the printed
//! example output stays readable, while a log file under `.logs/` keeps the
//! `INFO` trail of jobs and shuffles.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::SessionConfig;
use crate::error::{ErrorContext, Result};

pub const LOG_FILE_NAME: &str = "dalgo.log";

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub console_level: String,
    pub file_level: String,
    pub log_dir: PathBuf,
}

impl LoggingConfig {
    pub fn from_session(config: &SessionConfig) -> Self {
        Self {
            console_level: config.log_level.to_lowercase(),
            file_level: "info".to_string(),
            log_dir: config.project_root.join(".logs"),
        }
    }
}

/// Install the console and file layers. Calling it again is a no-op.
///
/// `RUST_LOG` takes precedence over the configured console level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.log_dir)
        .with_io_context(|| format!("creating log directory {}", config.log_dir.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_dir.join(LOG_FILE_NAME))
        .with_io_context(|| "opening log file".to_string())?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_lowercase()));
    let file_filter = EnvFilter::new(config.file_level.to_lowercase());

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_writer(Arc::new(log_file))
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .try_init();

    if installed.is_err() {
        debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_logging_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            console_level: "error".to_string(),
            file_level: "info".to_string(),
            log_dir: dir.path().join(".logs"),
        };

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();
        assert!(dir.path().join(".logs").join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_from_session_uses_session_level() {
        let session = SessionConfig::for_tests();
        let config = LoggingConfig::from_session(&session);
        assert_eq!(config.console_level, "warn");
        assert_eq!(config.file_level, "info");
        assert!(config.log_dir.ends_with(".logs"));
    }
}
