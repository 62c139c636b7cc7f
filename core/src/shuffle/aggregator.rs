//! Defines the Aggregator trait for combining values in shuffle operations.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::ops::Add;
use std::sync::Arc;

/// Aggregator trait for combining values for a key.
/// Used in operations like `reduce_by_key` and `combine_by_key`.
///
/// K: Key type
/// V: Input value type
/// C: Combiner (intermediate/output) type
pub trait Aggregator<K, V, C>: Send + Sync + Debug {
    /// Create a combiner from the first value for a key.
    fn create_combiner(&self, v: V) -> C;

    /// Merge a new value into an existing combiner.
    fn merge_value(&self, c: C, v: V) -> C;

    /// Merge two combiners.
    fn merge_combiners(&self, c1: C, c2: C) -> C;
}

type ReduceFn<V> = Arc<dyn Fn(V, V) -> V + Send + Sync>;

/// Aggregator for `reduce_by_key`, where the combiner type is the value type.
#[derive(Clone)]
pub struct ReduceAggregator<V> {
    reduce_func: ReduceFn<V>,
}

impl<V> ReduceAggregator<V> {
    pub fn new<F>(reduce_func: F) -> Self
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        Self {
            reduce_func: Arc::new(reduce_func),
        }
    }
}

impl<V> Debug for ReduceAggregator<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReduceAggregator").finish_non_exhaustive()
    }
}

impl<K, V> Aggregator<K, V, V> for ReduceAggregator<V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    fn create_combiner(&self, v: V) -> V {
        v
    }

    fn merge_value(&self, c: V, v: V) -> V {
        (self.reduce_func)(c, v)
    }

    fn merge_combiners(&self, c1: V, c2: V) -> V {
        (self.reduce_func)(c1, c2)
    }
}

/// A generic aggregator for `combine_by_key` and `aggregate_by_key`.
pub struct CombineAggregator<V, C> {
    create_combiner: Arc<dyn Fn(V) -> C + Send + Sync>,
    merge_value: Arc<dyn Fn(C, V) -> C + Send + Sync>,
    merge_combiners: Arc<dyn Fn(C, C) -> C + Send + Sync>,
}

impl<V, C> CombineAggregator<V, C> {
    pub fn new<F, G, H>(create_combiner: F, merge_value: G, merge_combiners: H) -> Self
    where
        F: Fn(V) -> C + Send + Sync + 'static,
        G: Fn(C, V) -> C + Send + Sync + 'static,
        H: Fn(C, C) -> C + Send + Sync + 'static,
    {
        Self {
            create_combiner: Arc::new(create_combiner),
            merge_value: Arc::new(merge_value),
            merge_combiners: Arc::new(merge_combiners),
        }
    }
}

impl<V, C> Clone for CombineAggregator<V, C> {
    fn clone(&self) -> Self {
        Self {
            create_combiner: self.create_combiner.clone(),
            merge_value: self.merge_value.clone(),
            merge_combiners: self.merge_combiners.clone(),
        }
    }
}

impl<V, C> Debug for CombineAggregator<V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombineAggregator").finish_non_exhaustive()
    }
}

impl<K, V, C> Aggregator<K, V, C> for CombineAggregator<V, C>
where
    K: Send + Sync,
    V: Send + Sync,
    C: Send + Sync,
{
    fn create_combiner(&self, v: V) -> C {
        (self.create_combiner)(v)
    }

    fn merge_value(&self, c: C, v: V) -> C {
        (self.merge_value)(c, v)
    }

    fn merge_combiners(&self, c1: C, c2: C) -> C {
        (self.merge_combiners)(c1, c2)
    }
}

/// Collects every value of a key; backs `group_by_key`.
#[derive(Clone, Debug)]
pub struct GroupAggregator<V> {
    _phantom: PhantomData<fn() -> V>,
}

impl<V> GroupAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V> Default for GroupAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Aggregator<K, V, Vec<V>> for GroupAggregator<V>
where
    K: Send + Sync,
    V: Send + Sync + Debug,
{
    fn create_combiner(&self, v: V) -> Vec<V> {
        vec![v]
    }

    fn merge_value(&self, mut c: Vec<V>, v: V) -> Vec<V> {
        c.push(v);
        c
    }

    fn merge_combiners(&self, mut c1: Vec<V>, c2: Vec<V>) -> Vec<V> {
        c1.extend(c2);
        c1
    }
}

/// Sums the values of a key.
#[derive(Clone, Debug)]
pub struct SumAggregator<V> {
    _phantom: PhantomData<fn() -> V>,
}

impl<V> SumAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V> Default for SumAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Aggregator<K, V, V> for SumAggregator<V>
where
    K: Send + Sync,
    V: Send + Sync + Debug + Add<Output = V>,
{
    fn create_combiner(&self, v: V) -> V {
        v
    }

    fn merge_value(&self, c: V, v: V) -> V {
        c + v
    }

    fn merge_combiners(&self, c1: V, c2: V) -> V {
        c1 + c2
    }
}

/// Count aggregator that counts the number of values per key
#[derive(Clone, Debug)]
pub struct CountAggregator<V> {
    _phantom: PhantomData<fn() -> V>,
}

impl<V> CountAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V> Default for CountAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Aggregator<K, V, u64> for CountAggregator<V>
where
    K: Send + Sync,
    V: Send + Sync + Debug,
{
    fn create_combiner(&self, _v: V) -> u64 {
        1
    }

    fn merge_value(&self, c: u64, _v: V) -> u64 {
        c + 1
    }

    fn merge_combiners(&self, c1: u64, c2: u64) -> u64 {
        c1 + c2
    }
}

/// Average aggregator: keeps the (sum, count) monoid and divides at the end.
#[derive(Clone, Debug)]
pub struct AverageAggregator<V> {
    _phantom: PhantomData<fn() -> V>,
}

impl<V> AverageAggregator<V> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V> Default for AverageAggregator<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Combiner for average calculation: (sum, count)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageCombiner<V> {
    pub sum: V,
    pub count: u64,
}

impl<V: Copy + Into<f64>> AverageCombiner<V> {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum.into() / self.count as f64
        }
    }
}

impl<K, V> Aggregator<K, V, AverageCombiner<V>> for AverageAggregator<V>
where
    K: Send + Sync,
    V: Send + Sync + Debug + Add<Output = V>,
{
    fn create_combiner(&self, v: V) -> AverageCombiner<V> {
        AverageCombiner { sum: v, count: 1 }
    }

    fn merge_value(&self, c: AverageCombiner<V>, v: V) -> AverageCombiner<V> {
        AverageCombiner {
            sum: c.sum + v,
            count: c.count + 1,
        }
    }

    fn merge_combiners(&self, c1: AverageCombiner<V>, c2: AverageCombiner<V>) -> AverageCombiner<V> {
        AverageCombiner {
            sum: c1.sum + c2.sum,
            count: c1.count + c2.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_aggregator() {
        let agg = ReduceAggregator::new(|a: i32, b: i32| a + b);
        let c = Aggregator::<&str, i32, i32>::create_combiner(&agg, 2);
        let c = Aggregator::<&str, i32, i32>::merge_value(&agg, c, 4);
        let c = Aggregator::<&str, i32, i32>::merge_combiners(&agg, c, 8);
        assert_eq!(c, 14);
    }

    #[test]
    fn test_combine_aggregator_sum_count() {
        let agg = CombineAggregator::new(
            |v: f64| (v, 1u32),
            |(s, c): (f64, u32), v: f64| (s + v, c + 1),
            |(s1, c1): (f64, u32), (s2, c2): (f64, u32)| (s1 + s2, c1 + c2),
        );
        let left = Aggregator::<String, f64, (f64, u32)>::create_combiner(&agg, 3.0);
        let left = Aggregator::<String, f64, (f64, u32)>::merge_value(&agg, left, 5.0);
        let right = Aggregator::<String, f64, (f64, u32)>::create_combiner(&agg, 4.0);
        let merged = Aggregator::<String, f64, (f64, u32)>::merge_combiners(&agg, left, right);
        assert_eq!(merged, (12.0, 3));
    }

    #[test]
    fn test_group_aggregator_preserves_order() {
        let agg = GroupAggregator::new();
        let c = Aggregator::<i32, &str, Vec<&str>>::create_combiner(&agg, "a");
        let c = Aggregator::<i32, &str, Vec<&str>>::merge_value(&agg, c, "b");
        let c = Aggregator::<i32, &str, Vec<&str>>::merge_combiners(&agg, c, vec!["c"]);
        assert_eq!(c, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_count_and_average_aggregators() {
        let count = CountAggregator::<i32>::new();
        let c = Aggregator::<String, i32, u64>::create_combiner(&count, 10);
        let c = Aggregator::<String, i32, u64>::merge_value(&count, c, 20);
        assert_eq!(Aggregator::<String, i32, u64>::merge_combiners(&count, c, 3), 5);

        let avg = AverageAggregator::<i32>::new();
        let a = Aggregator::<String, i32, AverageCombiner<i32>>::create_combiner(&avg, 2);
        let a = Aggregator::<String, i32, AverageCombiner<i32>>::merge_value(&avg, a, 4);
        let b = Aggregator::<String, i32, AverageCombiner<i32>>::create_combiner(&avg, 9);
        let merged = Aggregator::<String, i32, AverageCombiner<i32>>::merge_combiners(&avg, a, b);
        assert_eq!(merged.count, 3);
        assert_eq!(merged.average(), 5.0);
    }

    #[test]
    fn test_sum_aggregator() {
        let sum = SumAggregator::<i64>::new();
        let c = Aggregator::<u8, i64, i64>::create_combiner(&sum, 1);
        let c = Aggregator::<u8, i64, i64>::merge_value(&sum, c, 2);
        assert_eq!(Aggregator::<u8, i64, i64>::merge_combiners(&sum, c, 3), 6);
    }
}
