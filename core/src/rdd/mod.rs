//! RDD module
//!
//! [`FlowRdd`] is the user-facing handle to a lazily computed, partitioned
//! dataset. Transformations build new nodes in the lineage graph; actions (see
//! [`actions`]) hand the graph to the context's scheduler.

pub mod actions;
pub mod base;
pub mod cached_rdd;
pub mod distinct_rdd;
pub mod joined_rdd;
pub mod repartition_rdd;
pub mod shuffled_rdd;
pub mod sorted_rdd;
pub mod transformations;

use crate::context::FlowContext;
use crate::traits::{Data, Dependency, Rdd, RddBase, RddResult};
use base::{CartesianRdd, MapPartitionsRdd, PartitionFn, UnionRdd};
use std::fmt::Write as _;
use std::sync::Arc;

pub use base::{ParallelCollectionRdd, slice_evenly};
pub use joined_rdd::CoGroupedRdd;
pub use shuffled_rdd::{PartitionedRdd, ShuffledRdd};

/// Handle to a partitioned dataset of `T`.
pub struct FlowRdd<T: Data> {
    ctx: FlowContext,
    rdd: Arc<dyn Rdd<T>>,
    base: Arc<dyn RddBase>,
}

impl<T: Data> Clone for FlowRdd<T> {
    fn clone(&self) -> Self {
        Self {
            ctx: self.ctx.clone(),
            rdd: self.rdd.clone(),
            base: self.base.clone(),
        }
    }
}

impl<T: Data> std::fmt::Debug for FlowRdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRdd")
            .field("id", &self.base.id())
            .field("name", &self.base.name())
            .field("partitions", &self.base.num_partitions())
            .finish()
    }
}

impl<T: Data> FlowRdd<T> {
    pub(crate) fn from_node<N>(ctx: &FlowContext, node: N) -> Self
    where
        N: Rdd<T> + 'static,
    {
        let node = Arc::new(node);
        Self {
            ctx: ctx.clone(),
            rdd: node.clone(),
            base: node,
        }
    }

    pub(crate) fn parts(&self) -> (Arc<dyn Rdd<T>>, Arc<dyn RddBase>) {
        (self.rdd.clone(), self.base.clone())
    }

    pub(crate) fn node(&self) -> &Arc<dyn Rdd<T>> {
        &self.rdd
    }

    pub(crate) fn base(&self) -> &Arc<dyn RddBase> {
        &self.base
    }

    pub fn id(&self) -> usize {
        self.base.id()
    }

    pub fn num_partitions(&self) -> usize {
        self.base.num_partitions()
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    /// Indented description of the lineage, one line per RDD; shuffle
    /// boundaries are marked with `+-`.
    pub fn to_debug_string(&self) -> String {
        fn walk(base: &Arc<dyn RddBase>, depth: usize, shuffle: bool, out: &mut String) {
            let marker = if shuffle { "+-" } else { "" };
            let _ = writeln!(
                out,
                "{}{}({}) {}[{}]",
                "  ".repeat(depth),
                marker,
                base.num_partitions(),
                base.name(),
                base.id()
            );
            for dependency in base.dependencies() {
                match dependency {
                    Dependency::Narrow(parent) => walk(&parent, depth + 1, false, out),
                    Dependency::Shuffle(stage) => walk(&stage.parent(), depth + 1, true, out),
                }
            }
        }

        let mut out = String::new();
        walk(&self.base, 0, false, &mut out);
        out
    }

    fn with_partition_fn<U: Data>(&self, name: &'static str, func: PartitionFn<T, U>) -> FlowRdd<U> {
        let node = MapPartitionsRdd::new(
            self.ctx.new_rdd_id(),
            name,
            self.rdd.clone(),
            self.base.clone(),
            func,
        );
        FlowRdd::from_node(&self.ctx, node)
    }

    /// Return a new RDD by applying a function to each partition, along with its index.
    pub fn map_partitions_with_index<U, I, F>(&self, f: F) -> FlowRdd<U>
    where
        U: Data,
        I: IntoIterator<Item = U>,
        F: Fn(usize, std::vec::IntoIter<T>) -> I + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "mapPartitionsWithIndex",
            partition_fn(move |index, data: Vec<T>| Ok(f(index, data.into_iter()).into_iter().collect())),
        )
    }

    /// Return a new RDD by applying a function to each partition.
    pub fn map_partitions<U, I, F>(&self, f: F) -> FlowRdd<U>
    where
        U: Data,
        I: IntoIterator<Item = U>,
        F: Fn(std::vec::IntoIter<T>) -> I + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "mapPartitions",
            partition_fn(move |_, data: Vec<T>| Ok(f(data.into_iter()).into_iter().collect())),
        )
    }

    pub fn map<U, F>(&self, f: F) -> FlowRdd<U>
    where
        U: Data,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "map",
            partition_fn(move |_, data: Vec<T>| Ok(data.into_iter().map(&f).collect())),
        )
    }

    pub fn filter<F>(&self, predicate: F) -> FlowRdd<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "filter",
            partition_fn(move |_, data: Vec<T>| {
                Ok(data.into_iter().filter(|item| predicate(item)).collect())
            }),
        )
    }

    pub fn flat_map<U, I, F>(&self, f: F) -> FlowRdd<U>
    where
        U: Data,
        I: IntoIterator<Item = U>,
        F: Fn(T) -> I + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "flatMap",
            partition_fn(move |_, data: Vec<T>| Ok(data.into_iter().flat_map(&f).collect())),
        )
    }

    /// Collapse every partition into a single vector.
    pub fn glom(&self) -> FlowRdd<Vec<T>> {
        self.with_partition_fn("glom", partition_fn(|_, data: Vec<T>| Ok(vec![data])))
    }

    /// Pair every element with a key computed from it.
    pub fn key_by<K, F>(&self, f: F) -> FlowRdd<(K, T)>
    where
        K: Data,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.with_partition_fn(
            "keyBy",
            partition_fn(move |_, data: Vec<T>| {
                Ok(data.into_iter().map(|item| (f(&item), item)).collect())
            }),
        )
    }

    /// Concatenate the partitions of `self` and `other`; no deduplication.
    pub fn union(&self, other: &FlowRdd<T>) -> FlowRdd<T> {
        self.ctx.union(&[self.clone(), other.clone()])
    }

    /// All pairs `(a, b)` with `a` from `self` and `b` from `other`.
    pub fn cartesian<U: Data>(&self, other: &FlowRdd<U>) -> FlowRdd<(T, U)> {
        let node = CartesianRdd::new(self.ctx.new_rdd_id(), self.parts(), other.parts());
        FlowRdd::from_node(&self.ctx, node)
    }
}

/// Wrap a per-partition closure, fixing its signature for inference.
pub(crate) fn partition_fn<T, U, F>(f: F) -> PartitionFn<T, U>
where
    T: Data,
    U: Data,
    F: Fn(usize, Vec<T>) -> RddResult<Vec<U>> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn union_of<T: Data>(ctx: &FlowContext, rdds: &[FlowRdd<T>]) -> FlowRdd<T> {
    let parents = rdds.iter().map(FlowRdd::parts).collect();
    FlowRdd::from_node(ctx, UnionRdd::new(ctx.new_rdd_id(), parents))
}
