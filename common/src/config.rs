//! Session configuration shared by every example.
//!
//! A [`SessionConfig`] fixes the handful of engine options the examples rely
//! on (master, shuffle partitions, driver memory, log level) and derives the
//! application name from the example being run.

use std::path::PathBuf;

use crate::data_loader;
use crate::error::{CommonError, Result};

/// Prefix of every application name.
pub const APP_NAME_PREFIX: &str = "DataAlgorithms";

/// Default master: one worker thread per CPU.
pub const DEFAULT_MASTER: &str = "local[*]";

const DEFAULT_SHUFFLE_PARTITIONS: usize = 4;
const DEFAULT_DRIVER_MEMORY: &str = "2g";
const DEFAULT_LOG_LEVEL: &str = "ERROR";

/// Configuration for a single example session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub app_name: String,
    pub master: String,
    pub shuffle_partitions: usize,
    pub driver_memory: String,
    pub log_level: String,
    pub show_console_progress: bool,
    pub project_root: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME_PREFIX.to_string(),
            master: DEFAULT_MASTER.to_string(),
            shuffle_partitions: DEFAULT_SHUFFLE_PARTITIONS,
            driver_memory: DEFAULT_DRIVER_MEMORY.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            show_console_progress: false,
            project_root: data_loader::project_root(),
        }
    }
}

impl SessionConfig {
    /// Build the configuration for an example id such as `"movie_avg_rating"`.
    pub fn for_example(example: Option<&str>, master: &str) -> Result<Self> {
        parse_master(master)?;
        Ok(Self {
            app_name: app_name_for(example),
            master: master.to_string(),
            ..Self::default()
        })
    }

    /// Small, quiet configuration used by the test suites.
    pub fn for_tests() -> Self {
        Self {
            app_name: format!("{APP_NAME_PREFIX}-Tests"),
            master: "local[2]".to_string(),
            shuffle_partitions: 2,
            log_level: "WARN".to_string(),
            ..Self::default()
        }
    }

    pub fn with_master(mut self, master: &str) -> Result<Self> {
        parse_master(master)?;
        self.master = master.to_string();
        Ok(self)
    }

    pub fn with_shuffle_partitions(mut self, partitions: usize) -> Result<Self> {
        if partitions == 0 {
            return Err(CommonError::configuration_error(
                "shuffle partitions must be at least 1",
            ));
        }
        self.shuffle_partitions = partitions;
        Ok(self)
    }

    pub fn with_driver_memory(mut self, memory: &str) -> Result<Self> {
        parse_memory(memory)?;
        self.driver_memory = memory.trim().to_lowercase();
        Ok(self)
    }

    pub fn with_console_progress(mut self, show: bool) -> Self {
        self.show_console_progress = show;
        self
    }

    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_uppercase();
        self
    }

    /// Apply `DALGO_MASTER`, `DALGO_SHUFFLE_PARTITIONS` and `DALGO_LOG_LEVEL`.
    pub fn with_env_overrides(self) -> Result<Self> {
        let mut config = self;
        if let Ok(master) = std::env::var("DALGO_MASTER") {
            config = config.with_master(&master)?;
        }
        if let Ok(partitions) = std::env::var("DALGO_SHUFFLE_PARTITIONS") {
            let partitions = partitions.trim().parse::<usize>().map_err(|e| {
                CommonError::configuration_error_with_source(
                    format!("DALGO_SHUFFLE_PARTITIONS is not a number: {partitions}"),
                    e,
                )
            })?;
            config = config.with_shuffle_partitions(partitions)?;
        }
        if let Ok(level) = std::env::var("DALGO_LOG_LEVEL") {
            config = config.with_log_level(&level);
        }
        Ok(config)
    }

    /// Number of worker threads implied by the master string.
    pub fn worker_threads(&self) -> Result<usize> {
        parse_master(&self.master)
    }

    /// `driver_memory` in bytes.
    pub fn driver_memory_bytes(&self) -> Result<usize> {
        parse_memory(&self.driver_memory)
    }
}

/// `"movie_avg_rating"` becomes `"DataAlgorithms-MovieAvgRating"`.
pub fn app_name_for(example: Option<&str>) -> String {
    match example {
        Some(name) if !name.trim().is_empty() => {
            let title: String = name
                .split(['_', '-', ' '])
                .filter(|word| !word.is_empty())
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect();
            format!("{APP_NAME_PREFIX}-{title}")
        }
        _ => APP_NAME_PREFIX.to_string(),
    }
}

/// Parse a master string into a worker thread count.
///
/// Accepts `local`, `local[N]` and `local[*]`.
pub fn parse_master(master: &str) -> Result<usize> {
    let master = master.trim();
    if master == "local" {
        return Ok(1);
    }
    let inner = master
        .strip_prefix("local[")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| {
            CommonError::configuration_error(format!(
                "unsupported master '{master}', expected local, local[N] or local[*]"
            ))
        })?;
    if inner == "*" {
        return Ok(num_cpus::get().max(1));
    }
    match inner.parse::<usize>() {
        Ok(0) => Err(CommonError::configuration_error(
            "master must request at least one thread",
        )),
        Ok(threads) => Ok(threads),
        Err(e) => Err(CommonError::configuration_error_with_source(
            format!("invalid thread count in master '{master}'"),
            e,
        )),
    }
}

/// Parse a JVM-style size such as `512m` or `2g` into bytes. A bare
/// number is taken as bytes.
pub fn parse_memory(memory: &str) -> Result<usize> {
    let memory = memory.trim().to_lowercase();
    let (digits, shift) = match memory.chars().last() {
        Some('k') => (&memory[..memory.len() - 1], 10),
        Some('m') => (&memory[..memory.len() - 1], 20),
        Some('g') => (&memory[..memory.len() - 1], 30),
        Some('t') => (&memory[..memory.len() - 1], 40),
        _ => (memory.as_str(), 0),
    };
    let amount = digits.parse::<usize>().map_err(|e| {
        CommonError::configuration_error_with_source(format!("invalid memory size '{memory}'"), e)
    })?;
    if amount == 0 {
        return Err(CommonError::configuration_error("memory size must be positive"));
    }
    amount.checked_shl(shift).filter(|bytes| bytes >> shift == amount).ok_or_else(|| {
        CommonError::configuration_error(format!("memory size '{memory}' is too large"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.app_name, "DataAlgorithms");
        assert_eq!(config.master, "local[*]");
        assert_eq!(config.shuffle_partitions, 4);
        assert_eq!(config.driver_memory, "2g");
        assert_eq!(config.log_level, "ERROR");
        assert!(!config.show_console_progress);
    }

    #[test]
    fn test_app_name_for_example() {
        assert_eq!(app_name_for(None), "DataAlgorithms");
        assert_eq!(app_name_for(Some("")), "DataAlgorithms");
        assert_eq!(
            app_name_for(Some("movie_avg_rating")),
            "DataAlgorithms-MovieAvgRating"
        );
        assert_eq!(app_name_for(Some("pagerank")), "DataAlgorithms-Pagerank");
    }

    #[test]
    fn test_for_example_keeps_defaults() {
        let config = SessionConfig::for_example(Some("inverted_index"), "local[3]").unwrap();
        assert_eq!(config.app_name, "DataAlgorithms-InvertedIndex");
        assert_eq!(config.master, "local[3]");
        assert_eq!(config.shuffle_partitions, 4);
        assert_eq!(config.worker_threads().unwrap(), 3);
    }

    #[test]
    fn test_parse_master() {
        assert_eq!(parse_master("local").unwrap(), 1);
        assert_eq!(parse_master("local[4]").unwrap(), 4);
        assert!(parse_master("local[*]").unwrap() >= 1);
        assert!(parse_master("local[0]").is_err());
        assert!(parse_master("local[x]").is_err());
        assert!(parse_master("yarn").is_err());
    }

    #[test]
    fn test_test_config() {
        let config = SessionConfig::for_tests();
        assert_eq!(config.master, "local[2]");
        assert_eq!(config.shuffle_partitions, 2);
        assert_eq!(config.log_level, "WARN");
    }

    #[test]
    fn test_parse_memory() {
        assert_eq!(parse_memory("2g").unwrap(), 2 << 30);
        assert_eq!(parse_memory("512M").unwrap(), 512 << 20);
        assert_eq!(parse_memory("64k").unwrap(), 64 << 10);
        assert_eq!(parse_memory("1000").unwrap(), 1000);
        assert!(parse_memory("0g").is_err());
        assert!(parse_memory("lots").is_err());
        assert!(parse_memory("g").is_err());
    }

    #[test]
    fn test_driver_memory_and_progress_builders() {
        let config = SessionConfig::default()
            .with_driver_memory("1G")
            .unwrap()
            .with_console_progress(true);
        assert_eq!(config.driver_memory, "1g");
        assert_eq!(config.driver_memory_bytes().unwrap(), 1 << 30);
        assert!(config.show_console_progress);
        assert!(SessionConfig::default().with_driver_memory("big").is_err());
    }

    #[test]
    fn test_rejects_zero_shuffle_partitions() {
        assert!(SessionConfig::default().with_shuffle_partitions(0).is_err());
        let config = SessionConfig::default().with_shuffle_partitions(8).unwrap();
        assert_eq!(config.shuffle_partitions, 8);
    }
}
