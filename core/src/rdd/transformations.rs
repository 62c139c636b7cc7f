//! Key-value transformations on `FlowRdd<(K, V)>`.
//!
//! Unless a partition count is given, wide operations keep the parent's
//! partition count and hash-partition the keys.

use crate::rdd::shuffled_rdd::{PartitionedRdd, ShuffledRdd};
use crate::rdd::FlowRdd;
use crate::shuffle::{
    Aggregator, CombineAggregator, CountAggregator, GroupAggregator, HashPartitioner, Partitioner,
    ReduceAggregator, ShuffleDependency,
};
use crate::traits::{Data, RddResult};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

impl<K, V> FlowRdd<(K, V)>
where
    K: Data + Hash + Eq,
    V: Data,
{
    pub fn map_values<U, F>(&self, f: F) -> FlowRdd<(K, U)>
    where
        U: Data,
        F: Fn(V) -> U + Send + Sync + 'static,
    {
        self.map_partitions(move |records| {
            records
                .map(|(key, value)| (key, f(value)))
                .collect::<Vec<_>>()
        })
    }

    pub fn flat_map_values<U, I, F>(&self, f: F) -> FlowRdd<(K, U)>
    where
        U: Data,
        I: IntoIterator<Item = U>,
        F: Fn(V) -> I + Send + Sync + 'static,
    {
        self.map_partitions(move |records| {
            records
                .flat_map(|(key, value)| f(value).into_iter().map(move |u| (key.clone(), u)))
                .collect::<Vec<_>>()
        })
    }

    pub fn keys(&self) -> FlowRdd<K> {
        self.map(|(key, _)| key)
    }

    pub fn values(&self) -> FlowRdd<V> {
        self.map(|(_, value)| value)
    }

    fn default_partitioner(&self, num_partitions: usize) -> Arc<dyn Partitioner<K>> {
        Arc::new(HashPartitioner::new(num_partitions.max(1)))
    }

    /// Route every record to the partition chosen by `partitioner`.
    pub fn partition_by(&self, partitioner: Arc<dyn Partitioner<K>>) -> FlowRdd<(K, V)> {
        let (parent, parent_base) = self.parts();
        let dependency = Arc::new(ShuffleDependency::passthrough(
            self.context().new_shuffle_id(),
            parent,
            parent_base,
            partitioner,
        ));
        FlowRdd::from_node(
            self.context(),
            PartitionedRdd::new(self.context().new_rdd_id(), dependency),
        )
    }

    /// Generic shuffle aggregation.
    ///
    /// With `map_side_combine` every map task merges its own values per key
    /// before writing, so only one record per key and map task is shuffled.
    pub fn combine_by_key_with<C: Data>(
        &self,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
        partitioner: Arc<dyn Partitioner<K>>,
        map_side_combine: bool,
    ) -> FlowRdd<(K, C)> {
        let (parent, parent_base) = self.parts();
        let shuffle_id = self.context().new_shuffle_id();
        debug!(
            shuffle_id,
            parent = parent_base.id(),
            reducers = partitioner.num_partitions(),
            map_side_combine,
            "registering shuffle"
        );
        let dependency = if map_side_combine {
            ShuffleDependency::combining(
                shuffle_id,
                parent,
                parent_base,
                aggregator.clone(),
                partitioner,
            )
        } else {
            ShuffleDependency::passthrough(shuffle_id, parent, parent_base, partitioner)
        };
        let node = ShuffledRdd::new(self.context().new_rdd_id(), Arc::new(dependency), aggregator);
        FlowRdd::from_node(self.context(), node)
    }

    pub fn combine_by_key<C, F, G, H>(
        &self,
        create_combiner: F,
        merge_value: G,
        merge_combiners: H,
    ) -> FlowRdd<(K, C)>
    where
        C: Data,
        F: Fn(V) -> C + Send + Sync + 'static,
        G: Fn(C, V) -> C + Send + Sync + 'static,
        H: Fn(C, C) -> C + Send + Sync + 'static,
    {
        let aggregator = CombineAggregator::new(create_combiner, merge_value, merge_combiners);
        self.combine_by_key_with::<C>(
            Arc::new(aggregator),
            self.default_partitioner(self.num_partitions()),
            true,
        )
    }

    /// Fold the values of every key starting from `zero`; `seq` runs inside a
    /// partition and `comb` merges partial results across partitions.
    pub fn aggregate_by_key<U, S, C>(&self, zero: U, seq: S, comb: C) -> FlowRdd<(K, U)>
    where
        U: Data,
        S: Fn(U, V) -> U + Send + Sync + 'static,
        C: Fn(U, U) -> U + Send + Sync + 'static,
    {
        let seq = Arc::new(seq);
        let create_seq = seq.clone();
        self.combine_by_key(move |v| create_seq(zero.clone(), v), move |u, v| seq(u, v), comb)
    }

    pub fn reduce_by_key<F>(&self, f: F) -> FlowRdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        self.reduce_by_key_with_partitions(f, self.num_partitions())
    }

    pub fn reduce_by_key_with_partitions<F>(&self, f: F, num_partitions: usize) -> FlowRdd<(K, V)>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        self.combine_by_key_with::<V>(
            Arc::new(ReduceAggregator::new(f)),
            self.default_partitioner(num_partitions),
            true,
        )
    }

    /// Group the values of every key. Every record crosses the shuffle.
    pub fn group_by_key(&self) -> FlowRdd<(K, Vec<V>)> {
        self.group_by_key_with_partitions(self.num_partitions())
    }

    pub fn group_by_key_with_partitions(&self, num_partitions: usize) -> FlowRdd<(K, Vec<V>)> {
        self.combine_by_key_with::<Vec<V>>(
            Arc::new(GroupAggregator::<V>::new()),
            self.default_partitioner(num_partitions),
            false,
        )
    }

    /// Number of records per key.
    pub fn count_by_key(&self) -> RddResult<HashMap<K, u64>> {
        self.combine_by_key_with::<u64>(
            Arc::new(CountAggregator::<V>::new()),
            self.default_partitioner(self.num_partitions()),
            true,
        )
        .collect_as_map()
    }

    /// Collect into a map; later records win when a key repeats.
    pub fn collect_as_map(&self) -> RddResult<HashMap<K, V>> {
        Ok(self.collect()?.into_iter().collect())
    }

    /// All values recorded for `key`.
    pub fn lookup(&self, key: &K) -> RddResult<Vec<V>> {
        let wanted = key.clone();
        self.filter(move |(k, _)| *k == wanted).values().collect()
    }
}

impl<T: Data> FlowRdd<T> {
    /// Pair every element with its global position, counting from zero in
    /// partition order. Runs one job to size the partitions.
    pub fn zip_with_index(&self) -> RddResult<FlowRdd<(T, u64)>> {
        let sizes = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| data.len() as u64)?;
        let offsets: Vec<u64> = sizes
            .iter()
            .scan(0u64, |start, size| {
                let offset = *start;
                *start += size;
                Some(offset)
            })
            .collect();
        Ok(self.map_partitions_with_index(move |index, data| {
            let start = offsets.get(index).copied().unwrap_or_default();
            data.enumerate()
                .map(move |(i, item)| (item, start + i as u64))
        }))
    }
}
