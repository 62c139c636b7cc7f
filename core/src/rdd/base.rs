//! Narrow RDD nodes: source collections and per-partition transformations.

use crate::traits::{Data, Dependency, Rdd, RddBase, RddResult, check_partition};
use std::fmt::Debug;
use std::sync::Arc;

/// Slice `data` into `num_partitions` contiguous ranges.
///
/// Partition `i` covers `[i * len / n, (i + 1) * len / n)`, so sizes differ by at
/// most one and some partitions may be empty when `n > len`.
pub fn slice_evenly<T>(data: Vec<T>, num_partitions: usize) -> Vec<Vec<T>> {
    let num_partitions = num_partitions.max(1);
    let len = data.len();
    let mut slices = Vec::with_capacity(num_partitions);
    let mut items = data.into_iter();
    for i in 0..num_partitions {
        let start = i * len / num_partitions;
        let end = (i + 1) * len / num_partitions;
        slices.push(items.by_ref().take(end - start).collect());
    }
    slices
}

/// An RDD backed by an in-memory collection.
#[derive(Debug)]
pub struct ParallelCollectionRdd<T: Data> {
    id: usize,
    slices: Vec<Vec<T>>,
}

impl<T: Data> ParallelCollectionRdd<T> {
    pub fn new(id: usize, data: Vec<T>, num_partitions: usize) -> Self {
        Self {
            id,
            slices: slice_evenly(data, num_partitions),
        }
    }

    /// Use the given partitions as they are.
    pub fn from_slices(id: usize, slices: Vec<Vec<T>>) -> Self {
        let slices = if slices.is_empty() {
            vec![Vec::new()]
        } else {
            slices
        };
        Self { id, slices }
    }
}

impl<T: Data> RddBase for ParallelCollectionRdd<T> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "parallelize"
    }

    fn num_partitions(&self) -> usize {
        self.slices.len()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }
}

impl<T: Data> Rdd<T> for ParallelCollectionRdd<T> {
    fn compute(&self, partition: usize) -> RddResult<Vec<T>> {
        check_partition(partition, self.slices.len())?;
        Ok(self.slices[partition].clone())
    }
}

pub(crate) type PartitionFn<T, U> = Arc<dyn Fn(usize, Vec<T>) -> RddResult<Vec<U>> + Send + Sync>;

/// Applies a function to whole partitions of its parent. `map`, `filter`,
/// `flat_map`, `glom` and friends are all expressed through this node.
pub struct MapPartitionsRdd<T: Data, U: Data> {
    id: usize,
    name: &'static str,
    parent: Arc<dyn Rdd<T>>,
    parent_base: Arc<dyn RddBase>,
    func: PartitionFn<T, U>,
}

impl<T: Data, U: Data> MapPartitionsRdd<T, U> {
    pub fn new(
        id: usize,
        name: &'static str,
        parent: Arc<dyn Rdd<T>>,
        parent_base: Arc<dyn RddBase>,
        func: PartitionFn<T, U>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            parent_base,
            func,
        }
    }
}

impl<T: Data, U: Data> Debug for MapPartitionsRdd<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapPartitionsRdd")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent_base.id())
            .finish()
    }
}

impl<T: Data, U: Data> RddBase for MapPartitionsRdd<T, U> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn num_partitions(&self) -> usize {
        self.parent_base.num_partitions()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Narrow(self.parent_base.clone())]
    }
}

impl<T: Data, U: Data> Rdd<U> for MapPartitionsRdd<T, U> {
    fn compute(&self, partition: usize) -> RddResult<Vec<U>> {
        let input = self.parent.compute(partition)?;
        (self.func)(partition, input)
    }
}

/// Concatenation of the partitions of several RDDs.
pub struct UnionRdd<T: Data> {
    id: usize,
    parents: Vec<(Arc<dyn Rdd<T>>, Arc<dyn RddBase>)>,
}

impl<T: Data> UnionRdd<T> {
    pub fn new(id: usize, parents: Vec<(Arc<dyn Rdd<T>>, Arc<dyn RddBase>)>) -> Self {
        Self { id, parents }
    }
}

impl<T: Data> Debug for UnionRdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parents: Vec<usize> = self.parents.iter().map(|(_, base)| base.id()).collect();
        f.debug_struct("UnionRdd")
            .field("id", &self.id)
            .field("parents", &parents)
            .finish()
    }
}

impl<T: Data> RddBase for UnionRdd<T> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "union"
    }

    fn num_partitions(&self) -> usize {
        self.parents
            .iter()
            .map(|(_, base)| base.num_partitions())
            .sum()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.parents
            .iter()
            .map(|(_, base)| Dependency::Narrow(base.clone()))
            .collect()
    }
}

impl<T: Data> Rdd<T> for UnionRdd<T> {
    fn compute(&self, partition: usize) -> RddResult<Vec<T>> {
        check_partition(partition, self.num_partitions())?;
        let mut offset = partition;
        for (rdd, base) in &self.parents {
            let count = base.num_partitions();
            if offset < count {
                return rdd.compute(offset);
            }
            offset -= count;
        }
        Err(crate::traits::RddError::InvalidPartition(partition))
    }
}

/// Every pair of elements from two RDDs; partition `i * m + j` pairs left
/// partition `i` with right partition `j`.
pub struct CartesianRdd<T: Data, U: Data> {
    id: usize,
    left: Arc<dyn Rdd<T>>,
    left_base: Arc<dyn RddBase>,
    right: Arc<dyn Rdd<U>>,
    right_base: Arc<dyn RddBase>,
}

impl<T: Data, U: Data> CartesianRdd<T, U> {
    pub fn new(
        id: usize,
        left: (Arc<dyn Rdd<T>>, Arc<dyn RddBase>),
        right: (Arc<dyn Rdd<U>>, Arc<dyn RddBase>),
    ) -> Self {
        Self {
            id,
            left: left.0,
            left_base: left.1,
            right: right.0,
            right_base: right.1,
        }
    }
}

impl<T: Data, U: Data> Debug for CartesianRdd<T, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartesianRdd")
            .field("id", &self.id)
            .field("left", &self.left_base.id())
            .field("right", &self.right_base.id())
            .finish()
    }
}

impl<T: Data, U: Data> RddBase for CartesianRdd<T, U> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn num_partitions(&self) -> usize {
        self.left_base.num_partitions() * self.right_base.num_partitions()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![
            Dependency::Narrow(self.left_base.clone()),
            Dependency::Narrow(self.right_base.clone()),
        ]
    }
}

impl<T: Data, U: Data> Rdd<(T, U)> for CartesianRdd<T, U> {
    fn compute(&self, partition: usize) -> RddResult<Vec<(T, U)>> {
        check_partition(partition, self.num_partitions())?;
        let right_partitions = self.right_base.num_partitions();
        let left = self.left.compute(partition / right_partitions)?;
        let right = self.right.compute(partition % right_partitions)?;
        let mut pairs = Vec::with_capacity(left.len() * right.len());
        for l in &left {
            for r in &right {
                pairs.push((l.clone(), r.clone()));
            }
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_evenly_matches_range_formula() {
        let slices = slice_evenly((1..=12).collect::<Vec<i32>>(), 3);
        assert_eq!(
            slices,
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10, 11, 12]]
        );

        let slices = slice_evenly(vec![1, 2, 3, 4, 5], 2);
        assert_eq!(slices, vec![vec![1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn test_slice_evenly_allows_empty_partitions() {
        let slices = slice_evenly(vec![1, 2], 4);
        assert_eq!(slices.len(), 4);
        assert_eq!(slices.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(slices.iter().any(Vec::is_empty));
    }

    #[test]
    fn test_parallel_collection_rejects_bad_partition() {
        let rdd = ParallelCollectionRdd::new(1, vec![1, 2, 3], 2);
        assert_eq!(rdd.num_partitions(), 2);
        assert!(rdd.compute(5).is_err());
    }
}
