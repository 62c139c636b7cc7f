//! Total ordering through a range-partitioned shuffle.
//!
//! Keys are sampled with one job, a [`RangePartitioner`] is built from the
//! sample and every partition is sorted after the shuffle. Reading partitions
//! in order then yields the fully sorted dataset.

use crate::rdd::FlowRdd;
use crate::rdd::shuffled_rdd::PartitionedRdd;
use crate::shuffle::{Partitioner, RangePartitioner, ShuffleDependency, compare_keys};
use crate::traits::{Data, RddResult};
use std::sync::Arc;
use tracing::debug;

impl<K, V> FlowRdd<(K, V)>
where
    K: Data + PartialOrd,
    V: Data,
{
    pub fn sort_by_key(&self, ascending: bool) -> RddResult<FlowRdd<(K, V)>> {
        self.sort_by_key_with_partitions(ascending, self.num_partitions())
    }

    pub fn sort_by_key_with_partitions(
        &self,
        ascending: bool,
        num_partitions: usize,
    ) -> RddResult<FlowRdd<(K, V)>> {
        let sample: Vec<K> = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| {
                data.into_iter().map(|(key, _)| key).collect::<Vec<_>>()
            })?
            .into_iter()
            .flatten()
            .collect();
        let partitioner = RangePartitioner::from_sample(num_partitions, sample, ascending);
        debug!(
            requested = num_partitions,
            partitions = partitioner.num_partitions(),
            ascending,
            "range partitioner built from sample"
        );

        let (parent, parent_base) = self.parts();
        let dependency = ShuffleDependency::passthrough(
            self.context().new_shuffle_id(),
            parent,
            parent_base,
            Arc::new(partitioner),
        );
        let shuffled: FlowRdd<(K, V)> = FlowRdd::from_node(
            self.context(),
            PartitionedRdd::new(self.context().new_rdd_id(), Arc::new(dependency)),
        );

        Ok(shuffled.map_partitions(move |records| {
            let mut records: Vec<(K, V)> = records.collect();
            if ascending {
                records.sort_by(|a, b| compare_keys(&a.0, &b.0));
            } else {
                records.sort_by(|a, b| compare_keys(&b.0, &a.0));
            }
            records
        }))
    }
}

impl<T: Data> FlowRdd<T> {
    /// Sort the elements by a derived key.
    pub fn sort_by<K, F>(&self, key: F, ascending: bool) -> RddResult<FlowRdd<T>>
    where
        K: Data + PartialOrd,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Ok(self.key_by(key).sort_by_key(ascending)?.map(|(_, item)| item))
    }
}
