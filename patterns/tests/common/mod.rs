//! Shared helpers for the patterns integration tests

use dalgo_common::SessionConfig;
use dalgo_core::{FlowContext, create_session_with};

/// Create a quiet test context with a given name
pub fn create_test_context(name: &str) -> FlowContext {
    let mut config = SessionConfig::for_tests();
    config.app_name = format!("{}-{}", config.app_name, name);
    create_session_with(config).expect("test context")
}
