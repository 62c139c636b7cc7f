//! In-memory caching of computed partitions.

use crate::rdd::FlowRdd;
use crate::traits::{Data, Dependency, Rdd, RddBase, RddError, RddResult, check_partition};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Keeps every partition after its first computation.
///
/// The lock is not held while the parent computes, so two tasks racing on the
/// same cold partition may both compute it; the first stored result wins.
pub struct CachedRdd<T: Data> {
    id: usize,
    parent: Arc<dyn Rdd<T>>,
    parent_base: Arc<dyn RddBase>,
    partitions: Mutex<Vec<Option<Arc<Vec<T>>>>>,
}

impl<T: Data> CachedRdd<T> {
    pub fn new(id: usize, parent: Arc<dyn Rdd<T>>, parent_base: Arc<dyn RddBase>) -> Self {
        let slots = (0..parent_base.num_partitions()).map(|_| None).collect();
        Self {
            id,
            parent,
            parent_base,
            partitions: Mutex::new(slots),
        }
    }

    fn cached(&self, partition: usize) -> RddResult<Option<Arc<Vec<T>>>> {
        let partitions = self
            .partitions
            .lock()
            .map_err(|_| RddError::ComputationError("cache lock poisoned".to_string()))?;
        Ok(partitions.get(partition).cloned().flatten())
    }

    /// Number of partitions currently held in memory.
    pub fn cached_partitions(&self) -> usize {
        self.partitions
            .lock()
            .map(|partitions| partitions.iter().filter(|slot| slot.is_some()).count())
            .unwrap_or_default()
    }
}

impl<T: Data> Debug for CachedRdd<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRdd")
            .field("id", &self.id)
            .field("parent", &self.parent_base.id())
            .field("cached_partitions", &self.cached_partitions())
            .finish()
    }
}

impl<T: Data> RddBase for CachedRdd<T> {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> &'static str {
        "cache"
    }

    fn num_partitions(&self) -> usize {
        self.parent_base.num_partitions()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        vec![Dependency::Narrow(self.parent_base.clone())]
    }
}

impl<T: Data> Rdd<T> for CachedRdd<T> {
    fn compute(&self, partition: usize) -> RddResult<Vec<T>> {
        check_partition(partition, self.num_partitions())?;
        if let Some(hit) = self.cached(partition)? {
            debug!(rdd_id = self.id, partition, "cache hit");
            return Ok(hit.as_ref().clone());
        }

        let computed = Arc::new(self.parent.compute(partition)?);
        let mut partitions = self
            .partitions
            .lock()
            .map_err(|_| RddError::ComputationError("cache lock poisoned".to_string()))?;
        let slot = partitions[partition].get_or_insert_with(|| computed.clone());
        Ok(slot.as_ref().clone())
    }
}

impl<T: Data> FlowRdd<T> {
    /// Keep computed partitions in memory so later jobs skip the lineage.
    pub fn cache(&self) -> FlowRdd<T> {
        let (parent, parent_base) = self.parts();
        FlowRdd::from_node(
            self.context(),
            CachedRdd::new(self.context().new_rdd_id(), parent, parent_base),
        )
    }
}
