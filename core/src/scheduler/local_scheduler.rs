//! Local Task Scheduler
//!
//! This module provides a local task scheduler that uses a dedicated Rayon
//! thread pool to execute RDD partitions in parallel on a single machine.
//! Before a job runs, every shuffle in its lineage is materialized stage by
//! stage, so reduce-side tasks only ever read finished map outputs.

use crate::shuffle::{ShuffleMetrics, ShuffleMetricsRecorder};
use crate::traits::{Data, Dependency, Rdd, RddBase, RddError, RddResult};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// LocalScheduler manages parallel execution of tasks using Rayon
#[derive(Debug)]
pub struct LocalScheduler {
    pool: rayon::ThreadPool,
    num_threads: usize,
    show_progress: bool,
    next_job_id: AtomicUsize,
    metrics: ShuffleMetricsRecorder,
}

impl LocalScheduler {
    /// Create a new LocalScheduler with the specified number of threads
    pub fn new(num_threads: usize) -> RddResult<Self> {
        let num_threads = num_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("dalgo-worker-{index}"))
            .build()
            .map_err(|e| RddError::ContextError(format!("failed to build thread pool: {e}")))?;
        Ok(Self {
            pool,
            num_threads,
            show_progress: false,
            next_job_id: AtomicUsize::new(0),
            metrics: ShuffleMetricsRecorder::default(),
        })
    }

    /// Print a task counter per job to stderr.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn shows_progress(&self) -> bool {
        self.show_progress
    }

    /// Get the number of threads
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Cumulative shuffle statistics of every job run so far.
    pub fn shuffle_metrics(&self) -> ShuffleMetrics {
        self.metrics.snapshot()
    }

    /// Run `task` for every index in `0..num_tasks` on the pool, keeping index order.
    pub fn run_tasks<R, F>(&self, num_tasks: usize, task: F) -> RddResult<Vec<R>>
    where
        R: Send,
        F: Fn(usize) -> RddResult<R> + Send + Sync,
    {
        self.pool
            .install(|| (0..num_tasks).into_par_iter().map(&task).collect())
    }

    /// Run a job over every partition of `rdd`, applying `func` to each computed partition.
    pub fn run_job<T, R, F>(
        &self,
        base: &Arc<dyn RddBase>,
        rdd: &Arc<dyn Rdd<T>>,
        func: F,
    ) -> RddResult<Vec<R>>
    where
        T: Data,
        R: Send,
        F: Fn(usize, Vec<T>) -> R + Send + Sync,
    {
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();
        info!(
            job_id,
            rdd = base.name(),
            rdd_id = base.id(),
            partitions = base.num_partitions(),
            "starting job"
        );

        let mut visited = HashSet::new();
        self.prepare_stages(base, &mut visited)?;

        let total = base.num_partitions();
        let done = AtomicUsize::new(0);
        let results = self.run_tasks(total, |partition| {
            let result = rdd.compute(partition).map(|data| func(partition, data));
            if self.show_progress {
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                eprint!("\r[Job {job_id}: {finished}/{total} tasks]");
            }
            result
        })?;
        if self.show_progress {
            eprintln!();
        }

        info!(
            job_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "job finished"
        );
        Ok(results)
    }

    /// Execute a job and collect all results into a single vector, in partition order
    pub fn execute_and_collect<T: Data>(
        &self,
        base: &Arc<dyn RddBase>,
        rdd: &Arc<dyn Rdd<T>>,
    ) -> RddResult<Vec<T>> {
        let partitions = self.run_job(base, rdd, |_, data| data)?;
        Ok(partitions.into_iter().flatten().collect())
    }

    /// Execute a job and reduce the results using a fold operation
    pub fn execute_and_reduce<T, R, F, G>(
        &self,
        base: &Arc<dyn RddBase>,
        rdd: &Arc<dyn Rdd<T>>,
        identity: R,
        fold_fn: F,
        reduce_fn: G,
    ) -> RddResult<R>
    where
        T: Data,
        R: Send + Sync + Clone,
        F: Fn(R, T) -> R + Send + Sync,
        G: Fn(R, R) -> R,
    {
        let partials = self.run_job(base, rdd, |_, data| {
            data.into_iter().fold(identity.clone(), &fold_fn)
        })?;
        Ok(partials.into_iter().fold(identity, reduce_fn))
    }

    /// Materialize every shuffle reachable from `base`, parents first.
    fn prepare_stages(
        &self,
        base: &Arc<dyn RddBase>,
        visited: &mut HashSet<usize>,
    ) -> RddResult<()> {
        if !visited.insert(base.id()) {
            return Ok(());
        }
        for dependency in base.dependencies() {
            match dependency {
                Dependency::Narrow(parent) => self.prepare_stages(&parent, visited)?,
                Dependency::Shuffle(stage) => {
                    if stage.is_materialized() {
                        debug!(shuffle_id = stage.shuffle_id(), "reusing map outputs");
                        continue;
                    }
                    self.prepare_stages(&stage.parent(), visited)?;
                    let written = stage.run_map_stage(self)?;
                    self.metrics.record(&written);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdd::base::ParallelCollectionRdd;
    use tracing_test::traced_test;

    fn numbers(partitions: usize) -> (Arc<dyn RddBase>, Arc<dyn Rdd<i32>>) {
        let rdd = Arc::new(ParallelCollectionRdd::new(0, (0..8).collect::<Vec<i32>>(), partitions));
        (rdd.clone(), rdd)
    }

    #[test]
    fn test_local_scheduler_new() {
        let scheduler = LocalScheduler::new(4).unwrap();
        assert_eq!(scheduler.num_threads(), 4);
        assert_eq!(LocalScheduler::new(0).unwrap().num_threads(), 1);
    }

    #[test]
    fn test_run_tasks_keeps_index_order() {
        let scheduler = LocalScheduler::new(3).unwrap();
        let results = scheduler.run_tasks(5, |i| Ok(i * 10)).unwrap();
        assert_eq!(results, vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_run_tasks_propagates_errors() {
        let scheduler = LocalScheduler::new(2).unwrap();
        let result = scheduler.run_tasks(4, |i| {
            if i == 2 {
                Err(RddError::ComputationError("boom".to_string()))
            } else {
                Ok(i)
            }
        });
        assert!(matches!(result, Err(RddError::ComputationError(_))));
    }

    #[test]
    fn test_execute_and_collect() {
        let scheduler = LocalScheduler::new(2).unwrap();
        let (base, rdd) = numbers(3);
        let result = scheduler.execute_and_collect(&base, &rdd).unwrap();
        assert_eq!(result, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_execute_and_reduce() {
        let scheduler = LocalScheduler::new(2).unwrap();
        let (base, rdd) = numbers(4);
        let sum = scheduler
            .execute_and_reduce(&base, &rdd, 0, |acc, item| acc + item, |a, b| a + b)
            .unwrap();
        assert_eq!(sum, 28);
    }

    #[test]
    #[traced_test]
    fn test_job_boundaries_are_logged() {
        let scheduler = LocalScheduler::new(2).unwrap();
        let (base, rdd) = numbers(2);
        scheduler.execute_and_collect(&base, &rdd).unwrap();
        assert!(logs_contain("starting job"));
        assert!(logs_contain("job finished"));
    }

    #[test]
    fn test_progress_does_not_change_results() {
        let scheduler = LocalScheduler::new(2).unwrap().with_progress(true);
        assert!(scheduler.shows_progress());
        let (base, rdd) = numbers(4);
        let result = scheduler.execute_and_collect(&base, &rdd).unwrap();
        assert_eq!(result, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_job_sees_partition_index() {
        let scheduler = LocalScheduler::new(2).unwrap();
        let (base, rdd) = numbers(2);
        let sizes = scheduler
            .run_job(&base, &rdd, |index, data| (index, data.len()))
            .unwrap();
        assert_eq!(sizes, vec![(0, 4), (1, 4)]);
    }
}
