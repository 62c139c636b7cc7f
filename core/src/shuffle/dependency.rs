//! Defines shuffle dependencies between RDDs.
//!
//! A shuffle dependency owns the map side of a shuffle: it computes every
//! partition of its parent, buckets the records by reduce partition and keeps
//! the serialized buckets until the reduce side fetches them.

use crate::scheduler::LocalScheduler;
use crate::shuffle::{Aggregator, Partitioner, ShuffleWriteMetrics};
use crate::traits::{Data, Rdd, RddBase, RddError, RddResult};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tracing::{debug, info};

/// Type-erased view of a shuffle used by the scheduler to run map stages.
pub trait ShuffleStage: Send + Sync + Debug {
    fn shuffle_id(&self) -> usize;

    /// The RDD whose partitions feed the map side.
    fn parent(&self) -> Arc<dyn RddBase>;

    fn num_reducers(&self) -> usize;

    /// Whether the map outputs are already available.
    fn is_materialized(&self) -> bool;

    /// Compute and bucket every parent partition.
    fn run_map_stage(&self, scheduler: &LocalScheduler) -> RddResult<ShuffleWriteMetrics>;
}

/// Serialized buckets written by one map task, indexed by reduce partition.
#[derive(Debug)]
pub struct MapOutput {
    blocks: Vec<Vec<u8>>,
    records: u64,
}

type Bucketer<K, V> = Arc<dyn Fn(Vec<(K, V)>) -> RddResult<MapOutput> + Send + Sync>;

/// Represents a dependency on the output of a shuffle stage.
pub struct ShuffleDependency<K: Data, V: Data> {
    shuffle_id: usize,
    parent: Arc<dyn Rdd<(K, V)>>,
    parent_base: Arc<dyn RddBase>,
    num_reducers: usize,
    map_side_combine: bool,
    bucketer: Bucketer<K, V>,
    map_outputs: OnceLock<Vec<MapOutput>>,
}

impl<K: Data, V: Data> ShuffleDependency<K, V> {
    /// Records are routed unchanged; reduce partitions receive `(K, V)` pairs.
    pub fn passthrough(
        shuffle_id: usize,
        parent: Arc<dyn Rdd<(K, V)>>,
        parent_base: Arc<dyn RddBase>,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Self {
        let num_reducers = partitioner.num_partitions();
        let bucketer: Bucketer<K, V> = Arc::new(move |records: Vec<(K, V)>| {
            let mut buckets: Vec<Vec<(K, V)>> = (0..num_reducers).map(|_| Vec::new()).collect();
            for (key, value) in records {
                let reducer = partitioner.get_partition(&key);
                buckets[reducer].push((key, value));
            }
            encode_buckets(&buckets)
        });

        Self {
            shuffle_id,
            parent,
            parent_base,
            num_reducers,
            map_side_combine: false,
            bucketer,
            map_outputs: OnceLock::new(),
        }
    }

    /// Values are combined per key inside every map task before being written;
    /// reduce partitions receive `(K, C)` pairs.
    pub fn combining<C: Data>(
        shuffle_id: usize,
        parent: Arc<dyn Rdd<(K, V)>>,
        parent_base: Arc<dyn RddBase>,
        aggregator: Arc<dyn Aggregator<K, V, C>>,
        partitioner: Arc<dyn Partitioner<K>>,
    ) -> Self
    where
        K: Hash + Eq,
    {
        let num_reducers = partitioner.num_partitions();
        let bucketer: Bucketer<K, V> = Arc::new(move |records: Vec<(K, V)>| {
            let mut combined: Vec<IndexMap<K, Option<C>>> =
                (0..num_reducers).map(|_| IndexMap::new()).collect();
            for (key, value) in records {
                let reducer = partitioner.get_partition(&key);
                let slot = combined[reducer].entry(key).or_insert(None);
                *slot = Some(match slot.take() {
                    Some(current) => aggregator.merge_value(current, value),
                    None => aggregator.create_combiner(value),
                });
            }
            let buckets: Vec<Vec<(K, C)>> = combined
                .into_iter()
                .map(|bucket| {
                    bucket
                        .into_iter()
                        .filter_map(|(key, combiner)| combiner.map(|c| (key, c)))
                        .collect()
                })
                .collect();
            encode_buckets(&buckets)
        });

        Self {
            shuffle_id,
            parent,
            parent_base,
            num_reducers,
            map_side_combine: true,
            bucketer,
            map_outputs: OnceLock::new(),
        }
    }

    pub fn map_side_combine(&self) -> bool {
        self.map_side_combine
    }

    /// Fetch and decode the blocks of one reduce partition, one per map task,
    /// in map order.
    pub fn fetch<R: DeserializeOwned>(&self, reducer: usize) -> RddResult<Vec<Vec<R>>> {
        let outputs = self.map_outputs.get().ok_or_else(|| {
            RddError::ShuffleError(format!(
                "map outputs of shuffle {} are not available",
                self.shuffle_id
            ))
        })?;
        outputs
            .iter()
            .enumerate()
            .map(|(map_index, output)| {
                let block = output.blocks.get(reducer).ok_or_else(|| {
                    RddError::ShuffleError(format!(
                        "shuffle {} map {} has no block for reducer {}",
                        self.shuffle_id, map_index, reducer
                    ))
                })?;
                decode_block(block)
            })
            .collect()
    }
}

impl<K: Data, V: Data> Debug for ShuffleDependency<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffleDependency")
            .field("shuffle_id", &self.shuffle_id)
            .field("parent", &self.parent_base.id())
            .field("num_reducers", &self.num_reducers)
            .field("map_side_combine", &self.map_side_combine)
            .field("materialized", &self.map_outputs.get().is_some())
            .finish()
    }
}

impl<K: Data, V: Data> ShuffleStage for ShuffleDependency<K, V> {
    fn shuffle_id(&self) -> usize {
        self.shuffle_id
    }

    fn parent(&self) -> Arc<dyn RddBase> {
        self.parent_base.clone()
    }

    fn num_reducers(&self) -> usize {
        self.num_reducers
    }

    fn is_materialized(&self) -> bool {
        self.map_outputs.get().is_some()
    }

    fn run_map_stage(&self, scheduler: &LocalScheduler) -> RddResult<ShuffleWriteMetrics> {
        let started = Instant::now();
        let num_maps = self.parent_base.num_partitions();
        let parent = &self.parent;
        let bucketer = &self.bucketer;

        let outputs = scheduler.run_tasks(num_maps, |map_index| {
            let records = parent.compute(map_index)?;
            bucketer(records)
        })?;

        let metrics = ShuffleWriteMetrics {
            records_written: outputs.iter().map(|o| o.records).sum(),
            bytes_written: outputs
                .iter()
                .flat_map(|o| o.blocks.iter())
                .map(|b| b.len() as u64)
                .sum(),
        };

        if self.map_outputs.set(outputs).is_err() {
            debug!(shuffle_id = self.shuffle_id, "map outputs already registered");
        }

        info!(
            shuffle_id = self.shuffle_id,
            maps = num_maps,
            reducers = self.num_reducers,
            records = metrics.records_written,
            bytes = metrics.bytes_written,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "shuffle map stage finished"
        );
        Ok(metrics)
    }
}

fn encode_buckets<R: Serialize>(buckets: &[Vec<R>]) -> RddResult<MapOutput> {
    let records = buckets.iter().map(|b| b.len() as u64).sum();
    let blocks = buckets
        .iter()
        .map(|bucket| {
            bincode::serde::encode_to_vec(bucket, bincode::config::standard())
                .map_err(|e| RddError::SerializationError(e.to_string()))
        })
        .collect::<RddResult<Vec<_>>>()?;
    Ok(MapOutput { blocks, records })
}

fn decode_block<R: DeserializeOwned>(block: &[u8]) -> RddResult<Vec<R>> {
    bincode::serde::decode_from_slice::<Vec<R>, _>(block, bincode::config::standard())
        .map(|(records, _)| records)
        .map_err(|e| RddError::SerializationError(e.to_string()))
}
