//! Resource store interface and the in-process implementation
//!
//! Callers persist what families and the registry hand back; neither of
//! those persists anything on its own.

use crate::error::{CloudError, Result};
use crate::resource::{Resource, SharedResource, read_shared};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Keyed store of shared resource handles
pub trait ResourceStore: Send + Sync {
    /// Insert or replace the resource under its id
    fn save(&self, resource: SharedResource) -> Result<()>;

    fn get(&self, id: &str) -> Result<SharedResource>;

    /// Remove and return the handle
    fn delete(&self, id: &str) -> Result<SharedResource>;

    fn list(&self) -> Vec<SharedResource>;
}

/// Map-backed store living for the process lifetime
#[derive(Debug, Default)]
pub struct InMemoryStore {
    resources: RwLock<HashMap<String, SharedResource>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a freshly built resource in a shared handle and save it
    pub fn insert(&self, resource: Resource) -> Result<SharedResource> {
        let shared = resource.into_shared();
        self.save(shared.clone())?;
        Ok(shared)
    }

    pub fn len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time copies of every stored resource, oldest first
    pub fn snapshot(&self) -> Vec<Resource> {
        self.list()
            .iter()
            .map(|shared| read_shared(shared).clone())
            .collect()
    }
}

impl ResourceStore for InMemoryStore {
    fn save(&self, resource: SharedResource) -> Result<()> {
        let id = read_shared(&resource).id.clone();
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), resource);
        tracing::debug!("Saved resource {}", id);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<SharedResource> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("Resource", id))
    }

    fn delete(&self, id: &str) -> Result<SharedResource> {
        let removed = self
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| CloudError::not_found("Resource", id))?;
        tracing::debug!("Deleted resource {}", id);
        Ok(removed)
    }

    fn list(&self) -> Vec<SharedResource> {
        let mut resources: Vec<SharedResource> = self
            .resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        resources.sort_by_cached_key(|shared| {
            let resource = read_shared(shared);
            (resource.metadata.created_at, resource.id.clone())
        });
        resources
    }
}
