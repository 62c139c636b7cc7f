//! Duplicate removal through a combining shuffle.

use crate::rdd::FlowRdd;
use crate::traits::Data;
use std::hash::Hash;

impl<T> FlowRdd<T>
where
    T: Data + Hash + Eq,
{
    /// Distinct elements, keeping the parent's partition count.
    pub fn distinct(&self) -> FlowRdd<T> {
        self.distinct_with_partitions(self.num_partitions())
    }

    pub fn distinct_with_partitions(&self, num_partitions: usize) -> FlowRdd<T> {
        self.map(|item| (item, ()))
            .reduce_by_key_with_partitions(|_, _| (), num_partitions)
            .keys()
    }

    /// Elements of `self` that do not appear in `other`.
    pub fn subtract(&self, other: &FlowRdd<T>) -> FlowRdd<T> {
        self.map(|item| (item, ()))
            .subtract_by_key(&other.map(|item| (item, ())))
            .keys()
    }

    /// Distinct elements present in both RDDs.
    pub fn intersection(&self, other: &FlowRdd<T>) -> FlowRdd<T> {
        self.map(|item| (item, ()))
            .cogroup(&other.map(|item| (item, ())))
            .filter(|(_, (left, right))| !left.is_empty() && !right.is_empty())
            .keys()
    }
}
