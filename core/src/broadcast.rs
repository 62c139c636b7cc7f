//! Broadcast variables
//!
//! A broadcast variable is a read-only value shared by every task of a job.
//! Tasks capture a cheap handle instead of cloning the value into each closure,
//! which is what map-side joins rely on.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a broadcast variable
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastId(pub String);

impl BroadcastId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for BroadcastId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "broadcast_{}", self.0)
    }
}

/// Read-only value shared across tasks.
#[derive(Debug)]
pub struct Broadcast<T> {
    id: BroadcastId,
    value: Arc<T>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T: Send + Sync> Broadcast<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: BroadcastId::new(),
            value: Arc::new(value),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn id(&self) -> &BroadcastId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_clones_share_the_value() {
        let lookup: HashMap<&str, &str> = [("NY", "New York"), ("CA", "California")].into();
        let broadcast = Broadcast::new(lookup);
        let copy = broadcast.clone();

        assert_eq!(copy.id(), broadcast.id());
        assert!(std::ptr::eq(copy.value(), broadcast.value()));
        assert_eq!(copy.value().get("NY"), Some(&"New York"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Broadcast::new(1u8);
        let b = Broadcast::new(1u8);
        assert_ne!(a.id(), b.id());
        assert!(a.id().to_string().starts_with("broadcast_"));
    }
}
