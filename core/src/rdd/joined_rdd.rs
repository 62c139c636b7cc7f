//! Co-grouping of two pair RDDs and the joins built on top of it.

use crate::rdd::FlowRdd;
use crate::shuffle::{HashPartitioner, Partitioner, ShuffleDependency, ShuffleStage};
use crate::traits::{Data, Dependency, Rdd, RddBase, RddResult, check_partition};
use indexmap::IndexMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Both sides are shuffled with the same partitioner, so every key lands in
/// the same reduce partition on either side.
pub struct CoGroupedRdd<K: Data, V: Data, W: Data> {
    id: usize,
    left: Arc<ShuffleDependency<K, V>>,
    right: Arc<ShuffleDependency<K, W>>,
}

impl<K, V, W> CoGroupedRdd<K, V, W>
where
    K: Data + Hash + Eq,
    V: Data,
    W: Data,
{
    pub fn new(
        id: usize,
        left: Arc<ShuffleDependency<K, V>>,
        right: Arc<ShuffleDependency<K, W>>,
    ) -> Self {
        Self { id, left, right }
    }
}

impl<K: Data, V: Data, W: Data> Debug for CoGroupedRdd<K, V, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoGroupedRdd")
            .field("id", &self.id)
            .field("left", &self.left)
            .field("right", &self.right)
            .finish()
    }
}

impl<K, V, W> RddBase for CoGroupedRdd<K, V, W>
where
    K: Data + Hash + Eq,
    V: Data,
    W: Data,
{
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "cogroup"
    }

    fn num_partitions(&self) -> usize {
        self.left.num_reducers()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![
            Dependency::Shuffle(self.left.clone()),
            Dependency::Shuffle(self.right.clone()),
        ]
    }
}

impl<K, V, W> Rdd<(K, (Vec<V>, Vec<W>))> for CoGroupedRdd<K, V, W>
where
    K: Data + Hash + Eq,
    V: Data,
    W: Data,
{
    fn compute(&self, partition: usize) -> RddResult<Vec<(K, (Vec<V>, Vec<W>))>> {
        check_partition(partition, self.num_partitions())?;
        let mut groups: IndexMap<K, (Vec<V>, Vec<W>)> = IndexMap::new();
        for block in self.left.fetch::<(K, V)>(partition)? {
            for (key, value) in block {
                groups.entry(key).or_default().0.push(value);
            }
        }
        for block in self.right.fetch::<(K, W)>(partition)? {
            for (key, value) in block {
                groups.entry(key).or_default().1.push(value);
            }
        }
        Ok(groups.into_iter().collect())
    }
}

impl<K, V> FlowRdd<(K, V)>
where
    K: Data + Hash + Eq,
    V: Data,
{
    /// Group both RDDs by key. The result has as many partitions as the
    /// larger parent.
    pub fn cogroup<W: Data>(&self, other: &FlowRdd<(K, W)>) -> FlowRdd<(K, (Vec<V>, Vec<W>))> {
        let num_partitions = self.num_partitions().max(other.num_partitions());
        self.cogroup_with_partitions(other, num_partitions)
    }

    pub fn cogroup_with_partitions<W: Data>(
        &self,
        other: &FlowRdd<(K, W)>,
        num_partitions: usize,
    ) -> FlowRdd<(K, (Vec<V>, Vec<W>))> {
        let ctx = self.context();
        let partitioner: Arc<dyn Partitioner<K>> =
            Arc::new(HashPartitioner::new(num_partitions.max(1)));

        let (left, left_base) = self.parts();
        let left = ShuffleDependency::passthrough(
            ctx.new_shuffle_id(),
            left,
            left_base,
            partitioner.clone(),
        );
        let (right, right_base) = other.parts();
        let right =
            ShuffleDependency::passthrough(ctx.new_shuffle_id(), right, right_base, partitioner);

        let node = CoGroupedRdd::new(ctx.new_rdd_id(), Arc::new(left), Arc::new(right));
        FlowRdd::from_node(ctx, node)
    }

    /// Inner join: one output record per matching `(v, w)` pair.
    pub fn join<W: Data>(&self, other: &FlowRdd<(K, W)>) -> FlowRdd<(K, (V, W))> {
        self.cogroup(other).flat_map(|(key, (vs, ws))| {
            let mut joined = Vec::with_capacity(vs.len() * ws.len());
            for v in &vs {
                for w in &ws {
                    joined.push((key.clone(), (v.clone(), w.clone())));
                }
            }
            joined
        })
    }

    /// Every left record, with `None` where the right side has no match.
    pub fn left_outer_join<W: Data>(&self, other: &FlowRdd<(K, W)>) -> FlowRdd<(K, (V, Option<W>))> {
        self.cogroup(other).flat_map(|(key, (vs, ws))| {
            let mut joined = Vec::new();
            for v in &vs {
                if ws.is_empty() {
                    joined.push((key.clone(), (v.clone(), None)));
                }
                for w in &ws {
                    joined.push((key.clone(), (v.clone(), Some(w.clone()))));
                }
            }
            joined
        })
    }

    /// Every right record, with `None` where the left side has no match.
    pub fn right_outer_join<W: Data>(
        &self,
        other: &FlowRdd<(K, W)>,
    ) -> FlowRdd<(K, (Option<V>, W))> {
        self.cogroup(other).flat_map(|(key, (vs, ws))| {
            let mut joined = Vec::new();
            for w in &ws {
                if vs.is_empty() {
                    joined.push((key.clone(), (None, w.clone())));
                }
                for v in &vs {
                    joined.push((key.clone(), (Some(v.clone()), w.clone())));
                }
            }
            joined
        })
    }

    /// Records from both sides; unmatched keys pair with `None`.
    pub fn full_outer_join<W: Data>(
        &self,
        other: &FlowRdd<(K, W)>,
    ) -> FlowRdd<(K, (Option<V>, Option<W>))> {
        self.cogroup(other).flat_map(|(key, (vs, ws))| {
            let mut joined = Vec::new();
            match (vs.is_empty(), ws.is_empty()) {
                (false, true) => {
                    for v in vs {
                        joined.push((key.clone(), (Some(v), None)));
                    }
                }
                (true, false) => {
                    for w in ws {
                        joined.push((key.clone(), (None, Some(w))));
                    }
                }
                _ => {
                    for v in &vs {
                        for w in &ws {
                            joined.push((key.clone(), (Some(v.clone()), Some(w.clone()))));
                        }
                    }
                }
            }
            joined
        })
    }

    /// Keep the left records whose key is absent on the right.
    pub fn subtract_by_key<W: Data>(&self, other: &FlowRdd<(K, W)>) -> FlowRdd<(K, V)> {
        self.cogroup(other).flat_map(|(key, (vs, ws))| {
            if ws.is_empty() {
                vs.into_iter().map(|v| (key.clone(), v)).collect()
            } else {
                Vec::new()
            }
        })
    }
}
