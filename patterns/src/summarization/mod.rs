//! Summarization patterns: binning, in-mapper combining, top-N and min/max.

pub mod binning_and_sorting;
pub mod in_mapper_combining;
pub mod top_n_minmax;

pub const TOPIC: &str = "summarization";
