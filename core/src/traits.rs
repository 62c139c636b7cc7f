//! Core traits for the dalgo dataflow engine
//!
//! This module defines the fundamental abstractions for RDDs (Resilient Distributed Datasets):
//! the element bound, the computation traits and the lineage between RDDs.

use dalgo_common::CommonError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

use crate::shuffle::ShuffleStage;

/// Error types for RDD operations
#[derive(Error, Debug, Clone)]
pub enum RddError {
    #[error("Computation failed: {0}")]
    ComputationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid partition: {0}")]
    InvalidPartition(usize),

    #[error("Context error: {0}")]
    ContextError(String),

    #[error("Shuffle error: {0}")]
    ShuffleError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for RDD operations
pub type RddResult<T> = Result<T, RddError>;

impl From<CommonError> for RddError {
    fn from(err: CommonError) -> Self {
        RddError::ContextError(err.to_string())
    }
}

impl From<std::io::Error> for RddError {
    fn from(err: std::io::Error) -> Self {
        RddError::IoError(err.to_string())
    }
}

/// A data type that can be used in an RDD.
///
/// Elements cross shuffle boundaries in serialized form, hence the serde bounds.
pub trait Data: Send + Sync + Clone + Debug + Serialize + DeserializeOwned + 'static {}
impl<T> Data for T where T: Send + Sync + Clone + Debug + Serialize + DeserializeOwned + 'static {}

/// Base trait for all RDDs, containing non-generic methods.
pub trait RddBase: Send + Sync + Debug {
    /// Get a unique ID for this RDD.
    fn id(&self) -> usize;

    /// Short operator name used in logs.
    fn name(&self) -> &'static str;

    /// Get the number of partitions
    fn num_partitions(&self) -> usize;

    /// Get dependencies of this RDD (for lineage tracking)
    fn dependencies(&self) -> Vec<Dependency>;
}

/// Core RDD trait: how to produce the records of one partition.
pub trait Rdd<T: Data>: RddBase {
    /// Compute the elements of this RDD for the given partition index.
    fn compute(&self, partition: usize) -> RddResult<Vec<T>>;
}

/// Represents a dependency of an RDD on its parent(s).
#[derive(Clone, Debug)]
pub enum Dependency {
    /// Each child partition depends on a bounded set of parent partitions.
    Narrow(Arc<dyn RddBase>),
    /// Child partitions read the bucketed output of every parent partition.
    Shuffle(Arc<dyn ShuffleStage>),
}

pub(crate) fn check_partition(partition: usize, num_partitions: usize) -> RddResult<()> {
    if partition < num_partitions {
        Ok(())
    } else {
        Err(RddError::InvalidPartition(partition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_conversion() {
        let err: RddError = CommonError::configuration_error("bad master").into();
        match err {
            RddError::ContextError(msg) => assert!(msg.contains("bad master")),
            other => panic!("Expected ContextError, got {other:?}"),
        }
    }

    #[test]
    fn test_check_partition() {
        assert!(check_partition(0, 1).is_ok());
        assert!(matches!(
            check_partition(3, 3),
            Err(RddError::InvalidPartition(3))
        ));
    }
}
