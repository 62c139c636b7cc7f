//! Classic data design patterns and the inverted index.

pub mod classic_patterns;
pub mod inverted_index;

pub const TOPIC: &str = "design_patterns";
