//! Actions: operations that run a job and return results to the driver.

use crate::rdd::FlowRdd;
use crate::shuffle::compare_keys;
use crate::traits::{Data, RddResult};
use std::cmp::Ordering;
use std::iter::Sum;

impl<T: Data> FlowRdd<T> {
    /// Return all elements, partition by partition.
    pub fn collect(&self) -> RddResult<Vec<T>> {
        self.context()
            .scheduler()
            .execute_and_collect(self.base(), self.node())
    }

    /// The contents of every partition, in partition order.
    pub fn glom_collect(&self) -> RddResult<Vec<Vec<T>>> {
        self.context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| data)
    }

    pub fn count(&self) -> RddResult<usize> {
        let sizes = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| data.len())?;
        Ok(sizes.into_iter().sum())
    }

    /// The first `n` elements in partition order.
    pub fn take(&self, n: usize) -> RddResult<Vec<T>> {
        let mut taken = self.collect()?;
        taken.truncate(n);
        Ok(taken)
    }

    pub fn first(&self) -> RddResult<Option<T>> {
        Ok(self.take(1)?.into_iter().next())
    }

    /// Reduce the elements with an associative and commutative function.
    /// Returns `None` for an empty RDD.
    pub fn reduce<F>(&self, f: F) -> RddResult<Option<T>>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        let partials = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| data.into_iter().reduce(&f))?;
        Ok(partials.into_iter().flatten().reduce(&f))
    }

    /// Fold every partition starting from `zero`, then fold the partial results.
    pub fn fold<F>(&self, zero: T, f: F) -> RddResult<T>
    where
        F: Fn(T, T) -> T + Send + Sync,
    {
        self.context().scheduler().execute_and_reduce(
            self.base(),
            self.node(),
            zero,
            &f,
            &f,
        )
    }

    /// Aggregate with a per-partition sequence function and a combine function.
    pub fn aggregate<U, S, C>(&self, zero: U, seq: S, comb: C) -> RddResult<U>
    where
        U: Send + Sync + Clone,
        S: Fn(U, T) -> U + Send + Sync,
        C: Fn(U, U) -> U,
    {
        self.context()
            .scheduler()
            .execute_and_reduce(self.base(), self.node(), zero, seq, comb)
    }

    pub fn sum(&self) -> RddResult<T>
    where
        T: Sum<T>,
    {
        let partials = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| data.into_iter().sum::<T>())?;
        Ok(partials.into_iter().sum())
    }

    /// Run `f` once per partition for its side effects.
    pub fn foreach_partition<F>(&self, f: F) -> RddResult<()>
    where
        F: Fn(Vec<T>) + Send + Sync,
    {
        self.context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, data| f(data))?;
        Ok(())
    }

    /// The `n` smallest elements by `key`, in ascending key order.
    ///
    /// Each partition keeps only its own `n` best candidates before they are
    /// merged on the driver.
    pub fn take_ordered_by<K, F>(&self, n: usize, key: F) -> RddResult<Vec<T>>
    where
        K: PartialOrd,
        F: Fn(&T) -> K + Send + Sync,
    {
        let by_key = |a: &T, b: &T| compare_keys(&key(a), &key(b));
        let candidates = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, mut data| {
                data.sort_by(by_key);
                data.truncate(n);
                data
            })?;
        let mut merged: Vec<T> = candidates.into_iter().flatten().collect();
        merged.sort_by(by_key);
        merged.truncate(n);
        Ok(merged)
    }

    /// The `n` smallest elements in ascending order.
    pub fn take_ordered(&self, n: usize) -> RddResult<Vec<T>>
    where
        T: PartialOrd,
    {
        self.take_ordered_by(n, |item| item.clone())
    }

    /// The `n` largest elements in descending order.
    pub fn top(&self, n: usize) -> RddResult<Vec<T>>
    where
        T: PartialOrd,
    {
        let candidates = self
            .context()
            .scheduler()
            .run_job(self.base(), self.node(), |_, mut data| {
                data.sort_by(|a, b| descending(a, b));
                data.truncate(n);
                data
            })?;
        let mut merged: Vec<T> = candidates.into_iter().flatten().collect();
        merged.sort_by(|a, b| descending(a, b));
        merged.truncate(n);
        Ok(merged)
    }
}

fn descending<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    compare_keys(b, a)
}
