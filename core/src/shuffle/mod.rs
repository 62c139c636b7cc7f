//! Core components for shuffle operations.

pub mod aggregator;
pub mod dependency;
pub mod metrics;
pub mod partitioner;

pub use aggregator::*;
pub use dependency::*;
pub use metrics::*;
pub use partitioner::*;
