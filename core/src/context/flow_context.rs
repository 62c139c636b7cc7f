//! FlowContext - Local execution context for RDD and DataFrame operations
//!
//! A `FlowContext` owns the session configuration, the rayon-backed
//! scheduler that runs RDD jobs and a DataFusion `SessionContext` for the
//! DataFrame and SQL side. Handles are cheap to clone and share one state.

use crate::broadcast::Broadcast;
use crate::rdd::{FlowRdd, ParallelCollectionRdd, slice_evenly, union_of};
use crate::scheduler::LocalScheduler;
use crate::shuffle::ShuffleMetrics;
use crate::traits::{Data, RddError, RddResult};
use dalgo_common::SessionConfig;
use datafusion::execution::runtime_env::RuntimeEnvBuilder;
use datafusion::prelude::{SessionConfig as DataFusionConfig, SessionContext};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

struct Inner {
    config: SessionConfig,
    scheduler: LocalScheduler,
    session: SessionContext,
    next_rdd_id: AtomicUsize,
    next_shuffle_id: AtomicUsize,
}

/// FlowContext is the entry point of every job.
#[derive(Clone)]
pub struct FlowContext {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowContext")
            .field("app_name", &self.inner.config.app_name)
            .field("master", &self.inner.config.master)
            .field("threads", &self.inner.scheduler.num_threads())
            .field("shuffle_partitions", &self.inner.config.shuffle_partitions)
            .finish()
    }
}

impl FlowContext {
    /// Create a context from a resolved session configuration.
    pub fn new(config: SessionConfig) -> RddResult<Self> {
        let threads = config.worker_threads()?;
        let scheduler = LocalScheduler::new(threads)?.with_progress(config.show_console_progress);
        let memory_limit = config.driver_memory_bytes()?;
        let runtime = RuntimeEnvBuilder::new()
            .with_memory_limit(memory_limit, 1.0)
            .build_arc()
            .map_err(|e| RddError::ContextError(format!("failed to build runtime: {e}")))?;
        let df_config = DataFusionConfig::new()
            .with_target_partitions(config.shuffle_partitions)
            .with_information_schema(true);
        let session = SessionContext::new_with_config_rt(df_config, runtime);

        info!(
            app_name = %config.app_name,
            master = %config.master,
            threads,
            shuffle_partitions = config.shuffle_partitions,
            driver_memory = %config.driver_memory,
            "session started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                scheduler,
                session,
                next_rdd_id: AtomicUsize::new(0),
                next_shuffle_id: AtomicUsize::new(0),
            }),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Get the application name
    pub fn app_name(&self) -> &str {
        &self.inner.config.app_name
    }

    /// Partition count used by `parallelize`: the number of worker threads.
    pub fn default_parallelism(&self) -> usize {
        self.inner.scheduler.num_threads()
    }

    /// The DataFusion session for DataFrame and SQL work.
    pub fn sql(&self) -> &SessionContext {
        &self.inner.session
    }

    pub fn scheduler(&self) -> &LocalScheduler {
        &self.inner.scheduler
    }

    /// Cumulative shuffle statistics of this context.
    pub fn shuffle_metrics(&self) -> ShuffleMetrics {
        self.inner.scheduler.shuffle_metrics()
    }

    pub(crate) fn new_rdd_id(&self) -> usize {
        self.inner.next_rdd_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn new_shuffle_id(&self) -> usize {
        self.inner.next_shuffle_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Create an RDD from a vector of data
    pub fn parallelize<T: Data>(&self, data: Vec<T>) -> FlowRdd<T> {
        self.parallelize_with_partitions(data, self.default_parallelism())
    }

    /// Create an RDD from a vector with specified number of partitions
    pub fn parallelize_with_partitions<T: Data>(&self, data: Vec<T>, num_partitions: usize) -> FlowRdd<T> {
        let node = ParallelCollectionRdd::new(self.new_rdd_id(), data, num_partitions.max(1));
        FlowRdd::from_node(self, node)
    }

    /// Lines of a text file, split evenly over `max(min_partitions, 1)` partitions.
    pub fn text_file(&self, path: impl AsRef<Path>, min_partitions: usize) -> RddResult<FlowRdd<String>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RddError::IoError(format!("{}: {e}", path.display())))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        debug!(path = %path.display(), lines = lines.len(), "read text file");
        let slices = slice_evenly(lines, min_partitions.max(1));
        Ok(FlowRdd::from_node(
            self,
            ParallelCollectionRdd::from_slices(self.new_rdd_id(), slices),
        ))
    }

    /// `(path, content)` for every regular file in `dir`, sorted by path.
    pub fn whole_text_files(
        &self,
        dir: impl AsRef<Path>,
        min_partitions: usize,
    ) -> RddResult<FlowRdd<(String, String)>> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .map_err(|e| RddError::IoError(format!("{}: {e}", dir.display())))?
        {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            files.push((path.display().to_string(), content));
        }
        debug!(dir = %dir.display(), files = files.len(), "read whole text files");
        Ok(self.parallelize_with_partitions(files, min_partitions.max(1)))
    }

    /// Concatenate several RDDs; partitions keep their order.
    pub fn union<T: Data>(&self, rdds: &[FlowRdd<T>]) -> FlowRdd<T> {
        union_of(self, rdds)
    }

    /// Share a read-only value with every task.
    pub fn broadcast<T: Send + Sync>(&self, value: T) -> Broadcast<T> {
        let broadcast = Broadcast::new(value);
        debug!(id = %broadcast.id(), "created broadcast variable");
        broadcast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let ctx = FlowContext::new(SessionConfig::for_tests()).unwrap();
        let first = ctx.new_rdd_id();
        assert_eq!(ctx.new_rdd_id(), first + 1);
        assert_eq!(ctx.new_shuffle_id(), 0);
        assert_eq!(ctx.default_parallelism(), 2);
    }

    #[test]
    fn test_driver_memory_and_progress_reach_the_session() {
        let config = SessionConfig::for_tests()
            .with_driver_memory("64m")
            .unwrap()
            .with_console_progress(true);
        let ctx = FlowContext::new(config).unwrap();
        assert!(ctx.scheduler().shows_progress());
        assert_eq!(ctx.parallelize(vec![1, 2, 3]).count().unwrap(), 3);

        let mut bad = SessionConfig::for_tests();
        bad.driver_memory = "plenty".to_string();
        assert!(FlowContext::new(bad).is_err());
    }

    #[test]
    fn test_text_file_missing_is_error() {
        let ctx = FlowContext::new(SessionConfig::for_tests()).unwrap();
        let result = ctx.text_file("/definitely/not/here.txt", 2);
        assert!(matches!(result, Err(RddError::IoError(_))));
    }
}
