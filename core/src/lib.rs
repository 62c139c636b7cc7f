//! Dalgo Core - a local, partitioned RDD engine
//!
//! RDD lineage graphs are built lazily through [`FlowRdd`] and executed by a
//! rayon-backed [`LocalScheduler`]. Wide transformations go through
//! bincode-serialized shuffles that are materialized stage by stage.

pub mod broadcast;
pub mod context;
pub mod rdd;
pub mod scheduler;
pub mod shuffle;
pub mod traits;

pub use broadcast::{Broadcast, BroadcastId};
pub use context::{FlowContext, create_session, create_session_with};
pub use rdd::FlowRdd;
pub use scheduler::LocalScheduler;
pub use shuffle::{
    Aggregator, AverageAggregator, AverageCombiner, CombineAggregator, CountAggregator,
    CustomPartitioner, GroupAggregator, HashPartitioner, Partitioner, RangePartitioner,
    ReduceAggregator, ShuffleMetrics, SumAggregator,
};
pub use traits::{Data, Dependency, Rdd, RddBase, RddError, RddResult};
