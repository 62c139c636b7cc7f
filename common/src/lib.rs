//! Common utilities shared by the dalgo crates.
//!
//! Session configuration, logging setup, dataset location and CSV loading.

pub mod config;
pub mod data_loader;
pub mod error;
pub mod logging;

pub use config::{SessionConfig, app_name_for, parse_master, parse_memory};
pub use data_loader::{data_path, load_csv_as_tuples, output_dir, output_path, project_root};
pub use error::{CommonError, Diagnose, ErrorCategory, ErrorContext, Result};
pub use logging::{LoggingConfig, init_logging};
