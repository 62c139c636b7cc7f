//! Reduce side of a shuffle.

use crate::shuffle::{Aggregator, ShuffleDependency, ShuffleStage};
use crate::traits::{Data, Dependency, Rdd, RddBase, RddResult, check_partition};
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// An RDD that merges the shuffled values of every key with an [`Aggregator`].
///
/// When the dependency combined on the map side the blocks already hold
/// combiners and only `merge_combiners` runs here. Keys come out in the order
/// they were first seen while reading map outputs in map order.
pub struct ShuffledRdd<K: Data, V: Data, C: Data> {
    id: usize,
    dependency: Arc<ShuffleDependency<K, V>>,
    aggregator: Arc<dyn Aggregator<K, V, C>>,
}

impl<K, V, C> ShuffledRdd<K, V, C>
where
    K: Data + Hash + Eq,
    V: Data,
    C: Data,
{
    pub fn new(
        id: usize,
        dependency: Arc<ShuffleDependency<K, V>>,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
    ) -> Self {
        Self {
            id,
            dependency,
            aggregator,
        }
    }
}

impl<K: Data, V: Data, C: Data> Debug for ShuffledRdd<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffledRdd")
            .field("id", &self.id)
            .field("dependency", &self.dependency)
            .finish()
    }
}

impl<K, V, C> RddBase for ShuffledRdd<K, V, C>
where
    K: Data + Hash + Eq,
    V: Data,
    C: Data,
{
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "shuffled"
    }

    fn num_partitions(&self) -> usize {
        self.dependency.num_reducers()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Shuffle(self.dependency.clone())]
    }
}

impl<K, V, C> Rdd<(K, C)> for ShuffledRdd<K, V, C>
where
    K: Data + Hash + Eq,
    V: Data,
    C: Data,
{
    fn compute(&self, partition: usize) -> RddResult<Vec<(K, C)>> {
        check_partition(partition, self.num_partitions())?;
        let aggregator = self.aggregator.as_ref();
        let mut merged: IndexMap<K, Option<C>> = IndexMap::new();

        if self.dependency.map_side_combine() {
            for block in self.dependency.fetch::<(K, C)>(partition)? {
                for (key, combiner) in block {
                    let slot = merged.entry(key).or_insert(None);
                    *slot = Some(match slot.take() {
                        Some(current) => aggregator.merge_combiners(current, combiner),
                        None => combiner,
                    });
                }
            }
        } else {
            for block in self.dependency.fetch::<(K, V)>(partition)? {
                for (key, value) in block {
                    let slot = merged.entry(key).or_insert(None);
                    *slot = Some(match slot.take() {
                        Some(current) => aggregator.merge_value(current, value),
                        None => aggregator.create_combiner(value),
                    });
                }
            }
        }

        Ok(merged
            .into_iter()
            .filter_map(|(key, combiner)| combiner.map(|c| (key, c)))
            .collect())
    }
}

/// The raw `(K, V)` records routed to each reduce partition, without merging.
/// Backs `partition_by`, `repartition` and sorting.
pub struct PartitionedRdd<K: Data, V: Data> {
    id: usize,
    dependency: Arc<ShuffleDependency<K, V>>,
}

impl<K: Data, V: Data> PartitionedRdd<K, V> {
    pub fn new(id: usize, dependency: Arc<ShuffleDependency<K, V>>) -> Self {
        Self { id, dependency }
    }
}

impl<K: Data, V: Data> Debug for PartitionedRdd<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedRdd")
            .field("id", &self.id)
            .field("dependency", &self.dependency)
            .finish()
    }
}

impl<K: Data, V: Data> RddBase for PartitionedRdd<K, V> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "partitioned"
    }

    fn num_partitions(&self) -> usize {
        self.dependency.num_reducers()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Shuffle(self.dependency.clone())]
    }
}

impl<K: Data, V: Data> Rdd<(K, V)> for PartitionedRdd<K, V> {
    fn compute(&self, partition: usize) -> RddResult<Vec<(K, V)>> {
        check_partition(partition, self.num_partitions())?;
        Ok(self
            .dependency
            .fetch::<(K, V)>(partition)?
            .into_iter()
            .flatten()
            .collect())
    }
}
