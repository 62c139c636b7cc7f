//! Iterative and cross-study ranking.

pub mod pagerank;
pub mod rank_product;

pub const TOPIC: &str = "ranking";
