//! Common test utilities and helpers for integration tests

use dalgo_common::SessionConfig;
use dalgo_core::FlowContext;

/// Create a test context with a given name
pub fn create_test_context(name: &str) -> FlowContext {
    let mut config = SessionConfig::for_tests();
    config.app_name = format!("{}-{}", config.app_name, name);
    FlowContext::new(config).expect("test context")
}

/// Create test data for integer operations
#[allow(dead_code)]
pub fn create_test_i32_data() -> Vec<i32> {
    (1..=20).collect()
}

/// Create test data for key-value pairs (String, i32)
#[allow(dead_code)]
pub fn create_test_string_i32_data() -> Vec<(String, i32)> {
    vec![
        ("a".to_string(), 1),
        ("b".to_string(), 2),
        ("a".to_string(), 3),
        ("c".to_string(), 4),
        ("b".to_string(), 5),
        ("a".to_string(), 6),
    ]
}

/// Assert that two collections contain the same elements (order-independent)
#[allow(dead_code)]
pub fn assert_same_elements<T: Ord + Clone + std::fmt::Debug>(mut actual: Vec<T>, mut expected: Vec<T>) {
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
