//! Changing the number of partitions: `repartition` with a shuffle and
//! `coalesce` without one.

use crate::rdd::FlowRdd;
use crate::rdd::shuffled_rdd::PartitionedRdd;
use crate::shuffle::{CustomPartitioner, ShuffleDependency};
use crate::traits::{Data, Dependency, Rdd, RddBase, RddResult, check_partition};
use std::fmt::Debug;
use std::sync::Arc;

/// Merges contiguous ranges of parent partitions: child `i` reads parent
/// partitions `[i * n / m, (i + 1) * n / m)`.
pub struct CoalescedRdd<T: Data> {
    id: usize,
    num_partitions: usize,
    parent: Arc<dyn Rdd<T>>,
    parent_base: Arc<dyn RddBase>,
}

impl<T: Data> CoalescedRdd<T> {
    pub fn new(
        id: usize,
        num_partitions: usize,
        parent: Arc<dyn Rdd<T>>,
        parent_base: Arc<dyn RddBase>,
    ) -> Self {
        let num_partitions = num_partitions.clamp(1, parent_base.num_partitions().max(1));
        Self {
            id,
            num_partitions,
            parent,
            parent_base,
        }
    }

    fn parent_range(&self, partition: usize) -> std::ops::Range<usize> {
        let parents = self.parent_base.num_partitions();
        let start = partition * parents / self.num_partitions;
        let end = (partition + 1) * parents / self.num_partitions;
        start..end
    }
}

impl<T: Data> Debug for CoalescedRdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoalescedRdd")
            .field("id", &self.id)
            .field("num_partitions", &self.num_partitions)
            .field("parent", &self.parent_base.id())
            .finish()
    }
}

impl<T: Data> RddBase for CoalescedRdd<T> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "coalesce"
    }

    fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Narrow(self.parent_base.clone())]
    }
}

impl<T: Data> Rdd<T> for CoalescedRdd<T> {
    fn compute(&self, partition: usize) -> RddResult<Vec<T>> {
        check_partition(partition, self.num_partitions)?;
        let mut merged = Vec::new();
        for parent_partition in self.parent_range(partition) {
            merged.extend(self.parent.compute(parent_partition)?);
        }
        Ok(merged)
    }
}

impl<T: Data> FlowRdd<T> {
    /// Reduce the partition count without a shuffle. Asking for more
    /// partitions than the parent has keeps the parent's count.
    pub fn coalesce(&self, num_partitions: usize) -> FlowRdd<T> {
        let (parent, parent_base) = self.parts();
        let node = CoalescedRdd::new(
            self.context().new_rdd_id(),
            num_partitions,
            parent,
            parent_base,
        );
        FlowRdd::from_node(self.context(), node)
    }

    /// Redistribute the records over `num_partitions` partitions through a
    /// shuffle. Map task `m` deals its records round-robin starting at
    /// partition `m % n`, so the result is deterministic.
    pub fn repartition(&self, num_partitions: usize) -> FlowRdd<T> {
        let num_partitions = num_partitions.max(1);
        let keyed = self.map_partitions_with_index(move |map_index, records| {
            records
                .enumerate()
                .map(move |(i, item)| ((map_index + i) % num_partitions, item))
        });

        let (parent, parent_base) = keyed.parts();
        let dependency = ShuffleDependency::passthrough(
            self.context().new_shuffle_id(),
            parent,
            parent_base,
            Arc::new(CustomPartitioner::new(num_partitions, |target: &usize| *target)),
        );
        let shuffled: FlowRdd<(usize, T)> = FlowRdd::from_node(
            self.context(),
            PartitionedRdd::new(self.context().new_rdd_id(), Arc::new(dependency)),
        );
        shuffled.map(|(_, item)| item)
    }
}
