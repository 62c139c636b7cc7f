//! Defines partitioners for distributing data in a shuffle.

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Decides which reduce partition a key belongs to.
pub trait Partitioner<K>: Send + Sync + Debug {
    fn num_partitions(&self) -> usize;

    fn get_partition(&self, key: &K) -> usize;
}

/// A partitioner that uses the hash of the key to distribute data.
#[derive(Clone, Debug)]
pub struct HashPartitioner {
    num_partitions: usize,
    seed: u64,
}

impl HashPartitioner {
    pub fn new(num_partitions: usize) -> Self {
        Self::with_seed(num_partitions, 0)
    }

    pub fn with_seed(num_partitions: usize, seed: u64) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
            seed,
        }
    }
}

impl<K: Hash> Partitioner<K> for HashPartitioner {
    fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    fn get_partition(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() % self.num_partitions as u64) as usize
    }
}

/// A range partitioner that distributes keys based on sorted ranges.
/// Used by `sort_by_key` so that concatenating partitions yields a total order.
#[derive(Clone, Debug)]
pub struct RangePartitioner<K> {
    range_bounds: Vec<K>,
    ascending: bool,
}

impl<K> RangePartitioner<K>
where
    K: PartialOrd + Clone + Send + Sync + Debug,
{
    /// Create a range partitioner by sampling the given keys.
    ///
    /// Bounds are taken at evenly spaced positions of the sorted sample. Equal
    /// bounds are merged, so a small or skewed sample may yield fewer
    /// partitions than requested.
    pub fn from_sample(num_partitions: usize, mut sample: Vec<K>, ascending: bool) -> Self {
        let num_partitions = num_partitions.max(1);
        if sample.is_empty() || num_partitions == 1 {
            return Self {
                range_bounds: Vec::new(),
                ascending,
            };
        }

        sample.sort_by(compare_keys);
        let len = sample.len();
        let mut range_bounds: Vec<K> = Vec::with_capacity(num_partitions - 1);
        for i in 1..num_partitions {
            let index = (i * len / num_partitions).min(len - 1);
            let candidate = &sample[index];
            let is_new = range_bounds
                .last()
                .is_none_or(|last| compare_keys(last, candidate) == Ordering::Less);
            if is_new {
                range_bounds.push(candidate.clone());
            }
        }

        Self {
            range_bounds,
            ascending,
        }
    }

    pub fn bounds(&self) -> &[K] {
        &self.range_bounds
    }
}

impl<K> Partitioner<K> for RangePartitioner<K>
where
    K: PartialOrd + Clone + Send + Sync + Debug,
{
    fn num_partitions(&self) -> usize {
        self.range_bounds.len() + 1
    }

    fn get_partition(&self, key: &K) -> usize {
        let position = self
            .range_bounds
            .partition_point(|bound| compare_keys(bound, key) == Ordering::Less);
        if self.ascending {
            position
        } else {
            self.range_bounds.len() - position
        }
    }
}

/// Total order over partially ordered keys; incomparable values tie.
pub fn compare_keys<K: PartialOrd>(a: &K, b: &K) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

/// A custom partitioner that allows users to define their own partitioning logic.
#[derive(Clone)]
pub struct CustomPartitioner<K> {
    num_partitions: usize,
    partition_func: Arc<dyn Fn(&K) -> usize + Send + Sync>,
}

impl<K> CustomPartitioner<K> {
    pub fn new<F>(num_partitions: usize, partition_func: F) -> Self
    where
        F: Fn(&K) -> usize + Send + Sync + 'static,
    {
        Self {
            num_partitions: num_partitions.max(1),
            partition_func: Arc::new(partition_func),
        }
    }
}

impl<K> Partitioner<K> for CustomPartitioner<K>
where
    K: Send + Sync,
{
    fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    fn get_partition(&self, key: &K) -> usize {
        (self.partition_func)(key) % self.num_partitions
    }
}

impl<K> Debug for CustomPartitioner<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomPartitioner")
            .field("num_partitions", &self.num_partitions)
            .field("partition_func", &"<function>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_partitioner_is_deterministic() {
        let partitioner = HashPartitioner::new(4);
        let first = Partitioner::<String>::get_partition(&partitioner, &"alex".to_string());
        let second = Partitioner::<String>::get_partition(&partitioner, &"alex".to_string());
        assert_eq!(first, second);
        assert!(first < 4);
    }

    #[test]
    fn test_hash_partitioner_spreads_keys() {
        let partitioner = HashPartitioner::new(3);
        let mut seen = [false; 3];
        for key in 0..100i64 {
            seen[partitioner.get_partition(&key)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn test_range_partitioner_ascending() {
        let partitioner = RangePartitioner::from_sample(3, (1..=9).collect::<Vec<i32>>(), true);
        assert_eq!(partitioner.num_partitions(), 3);
        assert_eq!(partitioner.get_partition(&1), 0);
        assert_eq!(partitioner.get_partition(&9), 2);
        assert!(partitioner.get_partition(&5) >= partitioner.get_partition(&2));
    }

    #[test]
    fn test_range_partitioner_descending() {
        let partitioner = RangePartitioner::from_sample(3, (1..=9).collect::<Vec<i32>>(), false);
        assert_eq!(partitioner.get_partition(&9), 0);
        assert_eq!(partitioner.get_partition(&1), 2);
    }

    #[test]
    fn test_range_partitioner_merges_duplicate_bounds() {
        let partitioner = RangePartitioner::from_sample(4, vec![7, 7, 7, 7], true);
        assert_eq!(partitioner.num_partitions(), 2);
        assert_eq!(partitioner.bounds(), &[7]);
    }

    #[test]
    fn test_range_partitioner_float_keys() {
        let partitioner = RangePartitioner::from_sample(2, vec![0.5, 2.5, 1.5, 3.5], true);
        assert_eq!(partitioner.get_partition(&0.1), 0);
        assert_eq!(partitioner.get_partition(&9.0), 1);
    }

    #[test]
    fn test_custom_partitioner_wraps_modulo() {
        let partitioner = CustomPartitioner::new(3, |key: &usize| *key);
        assert_eq!(partitioner.get_partition(&7), 1);
        assert_eq!(partitioner.num_partitions(), 3);
    }
}
