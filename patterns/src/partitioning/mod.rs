//! Logical partitions of RDDs and physical partitioning of files on disk.

pub mod partition_basics;
pub mod physical_partitioning;

pub const TOPIC: &str = "partitioning";
