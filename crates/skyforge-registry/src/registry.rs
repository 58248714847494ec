//! The process-wide prototype registry

use crate::model::{Category, PrototypeEntry, SearchQuery, Statistics, UsageLeader};
use chrono::Utc;
use skyforge_cloud::{
    ClonePolicy, Cloneable, CloudError, Resource, Result, SharedResource, naming, read_shared,
    write_shared,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, PrototypeEntry>,

    /// Prototype ids in registration order
    order: Vec<String>,

    by_category: BTreeMap<Category, Vec<String>>,

    /// resource id → prototype id
    by_resource: HashMap<String, String>,
}

impl Inner {
    fn ordered(&self) -> impl Iterator<Item = &PrototypeEntry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }
}

/// Registry of prototypes shared by every consumer in the process.
///
/// All mutations (`register`, `clone`, `delete`) take the registry write
/// lock, so they are mutually exclusive; reads share the read lock and see
/// each entry either before or after a mutation, never halfway. The registry
/// lock is always taken before any resource lock.
#[derive(Debug, Default)]
pub struct PrototypeRegistry {
    inner: RwLock<Inner>,
    clone_policy: ClonePolicy,
}

impl PrototypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose clones follow `policy` instead of the kind defaults
    pub fn with_clone_policy(policy: ClonePolicy) -> Self {
        Self {
            inner: RwLock::default(),
            clone_policy: policy,
        }
    }

    pub fn clone_policy(&self) -> &ClonePolicy {
        &self.clone_policy
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `resource` as a prototype and return the new prototype id.
    ///
    /// Fails with `IneligibleState` unless the resource is clone-eligible and
    /// with `AlreadyTemplated` if it was registered before, even if that
    /// prototype has since been deleted.
    pub fn register(
        &self,
        resource: &SharedResource,
        name: &str,
        description: &str,
        category: Category,
        tags: BTreeMap<String, String>,
    ) -> Result<String> {
        let mut inner = self.write();
        let mut target = write_shared(resource);

        if !target.is_clone_eligible() {
            return Err(CloudError::IneligibleState {
                id: target.id.clone(),
                status: target.status,
            });
        }
        if target.metadata.is_template {
            let prototype_id = inner
                .by_resource
                .get(&target.id)
                .cloned()
                .unwrap_or_else(|| {
                    format!(
                        "{} (deleted)",
                        target.metadata.template_name.as_deref().unwrap_or("unnamed")
                    )
                });
            return Err(CloudError::AlreadyTemplated {
                resource_id: target.id.clone(),
                prototype_id,
            });
        }

        let id = format!("proto-{}", naming::token(12));
        target.metadata.is_template = true;
        target.metadata.template_name = Some(name.to_string());

        let entry = PrototypeEntry {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            tags,
            resource: resource.clone(),
            created_at: Utc::now(),
            usage_count: 0,
            last_used_at: None,
        };

        inner.by_resource.insert(target.id.clone(), id.clone());
        inner
            .by_category
            .entry(category)
            .or_default()
            .push(id.clone());
        inner.order.push(id.clone());
        inner.entries.insert(id.clone(), entry);

        info!(
            "Registered prototype {} '{}' ({}) from {} {}",
            id, name, category, target.kind, target.id
        );
        Ok(id)
    }

    /// Clone the resource behind a prototype.
    ///
    /// `new_name` replaces the clone's display name along with the identifiers
    /// derived from it; `custom_tags` are merged
    /// over the tags copied from the source. The clone is returned, not stored.
    pub fn clone(
        &self,
        prototype_id: &str,
        new_name: Option<&str>,
        custom_tags: &BTreeMap<String, String>,
    ) -> Result<Resource> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(prototype_id)
            .ok_or_else(|| CloudError::not_found("Prototype", prototype_id))?;

        let mut copy = write_shared(&entry.resource).clone_as(&self.clone_policy, new_name)?;
        copy.tags
            .extend(custom_tags.iter().map(|(k, v)| (k.clone(), v.clone())));

        entry.usage_count += 1;
        entry.last_used_at = Some(Utc::now());

        info!(
            "Cloned prototype {} '{}' into {} '{}' (usage {})",
            entry.id, entry.name, copy.id, copy.name, entry.usage_count
        );
        Ok(copy)
    }

    /// Entries matching every filter of `query`, in registration order
    pub fn search(&self, query: &SearchQuery) -> Vec<PrototypeEntry> {
        let inner = self.read();
        let found: Vec<PrototypeEntry> = inner
            .ordered()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        debug!("Search {:?} matched {} prototype(s)", query, found.len());
        found
    }

    /// All entries, or those in `category`, in registration order
    pub fn list(&self, category: Option<Category>) -> Vec<PrototypeEntry> {
        let inner = self.read();
        match category {
            Some(category) => inner
                .by_category
                .get(&category)
                .into_iter()
                .flatten()
                .filter_map(|id| inner.entries.get(id))
                .cloned()
                .collect(),
            None => inner.ordered().cloned().collect(),
        }
    }

    pub fn get(&self, prototype_id: &str) -> Result<PrototypeEntry> {
        self.read()
            .entries
            .get(prototype_id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("Prototype", prototype_id))
    }

    /// Remove a prototype.
    ///
    /// The backing resource and every clone made from it are untouched, and
    /// the resource stays flagged as a template.
    pub fn delete(&self, prototype_id: &str) -> Result<PrototypeEntry> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .remove(prototype_id)
            .ok_or_else(|| CloudError::not_found("Prototype", prototype_id))?;

        inner.order.retain(|id| id != prototype_id);
        if let Some(ids) = inner.by_category.get_mut(&entry.category) {
            ids.retain(|id| id != prototype_id);
            if ids.is_empty() {
                inner.by_category.remove(&entry.category);
            }
        }
        let resource_id = entry.resource_id();
        inner.by_resource.remove(&resource_id);

        info!("Deleted prototype {} '{}'", entry.id, entry.name);
        Ok(entry)
    }

    /// Categories holding at least one prototype
    pub fn categories(&self) -> Vec<Category> {
        self.read().by_category.keys().copied().collect()
    }

    /// The prototype backed by `resource_id`, if any
    pub fn find_by_resource(&self, resource_id: &str) -> Option<PrototypeEntry> {
        let inner = self.read();
        inner
            .by_resource
            .get(resource_id)
            .and_then(|id| inner.entries.get(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> Statistics {
        let inner = self.read();
        let mut stats = Statistics::default();
        let mut leader: Option<&PrototypeEntry> = None;

        for entry in inner.ordered() {
            stats.total_prototypes += 1;
            stats.total_clones += entry.usage_count;

            let category = stats.by_category.entry(entry.category).or_default();
            category.count += 1;
            category.clones += entry.usage_count;

            *stats
                .by_provider
                .entry(read_shared(&entry.resource).provider)
                .or_default() += 1;

            // Strictly greater keeps the earliest on ties
            if entry.usage_count > 0
                && leader.is_none_or(|best| entry.usage_count > best.usage_count)
            {
                leader = Some(entry);
            }
        }

        stats.most_used = leader.map(|entry| UsageLeader {
            id: entry.id.clone(),
            name: entry.name.clone(),
            usage_count: entry.usage_count,
        });
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyforge_cloud::{Provider, ResourceKind, ResourceStatus};

    fn running(kind: ResourceKind) -> SharedResource {
        let mut resource = Resource::new(Provider::Aws, kind, "base", "us-east-1", "test");
        resource.mark_provisioned().unwrap();
        resource.into_shared()
    }

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_register_flags_resource() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::VirtualMachine);

        let id = registry
            .register(&resource, "base", "golden image", Category::Vm, BTreeMap::new())
            .unwrap();

        assert!(id.starts_with("proto-"));
        let metadata = &read_shared(&resource).metadata;
        assert!(metadata.is_template);
        assert_eq!(metadata.template_name.as_deref(), Some("base"));
        assert_eq!(registry.categories(), vec![Category::Vm]);
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::Database);
        let first = registry
            .register(&resource, "db", "", Category::Database, BTreeMap::new())
            .unwrap();

        let err = registry
            .register(&resource, "db-again", "", Category::Database, BTreeMap::new())
            .unwrap_err();
        match err {
            CloudError::AlreadyTemplated { prototype_id, .. } => assert_eq!(prototype_id, first),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_delete_keeps_template_flag() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::ObjectStore);
        let id = registry
            .register(&resource, "assets", "", Category::Storage, BTreeMap::new())
            .unwrap();

        registry.delete(&id).unwrap();
        assert!(registry.is_empty());
        assert!(registry.categories().is_empty());
        assert!(read_shared(&resource).metadata.is_template);
        assert!(matches!(
            registry.register(&resource, "assets", "", Category::Storage, BTreeMap::new()),
            Err(CloudError::AlreadyTemplated { .. })
        ));
        assert!(matches!(
            registry.delete(&id),
            Err(CloudError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clone_merges_tags_and_counts_usage() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::VirtualMachine);
        write_shared(&resource).set_tag("env", "prod");
        write_shared(&resource).set_tag("team", "web");
        let id = registry
            .register(&resource, "base", "", Category::Vm, BTreeMap::new())
            .unwrap();

        let copy = registry
            .clone(&id, Some("web-02"), &tags(&[("env", "staging")]))
            .unwrap();

        assert_eq!(copy.name, "web-02");
        assert_eq!(copy.status, ResourceStatus::Creating);
        assert_eq!(copy.tags.get("env").map(String::as_str), Some("staging"));
        assert_eq!(copy.tags.get("team").map(String::as_str), Some("web"));
        assert!(!copy.metadata.is_template);

        let entry = registry.get(&id).unwrap();
        assert_eq!(entry.usage_count, 1);
        assert!(entry.last_used_at.is_some());
        assert_eq!(read_shared(&resource).metadata.clone_count, 1);
        assert_eq!(read_shared(&resource).name, "base");
    }

    #[test]
    fn test_clone_of_terminated_source_fails_cleanly() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::VirtualMachine);
        let id = registry
            .register(&resource, "base", "", Category::Vm, BTreeMap::new())
            .unwrap();

        write_shared(&resource)
            .apply(skyforge_cloud::LifecycleAction::Terminate)
            .unwrap();

        assert!(matches!(
            registry.clone(&id, None, &BTreeMap::new()),
            Err(CloudError::IneligibleState { .. })
        ));
        assert_eq!(registry.get(&id).unwrap().usage_count, 0);
    }

    #[test]
    fn test_list_and_search_keep_registration_order() {
        let registry = PrototypeRegistry::new();
        for (name, category) in [
            ("alpha", Category::Vm),
            ("beta", Category::Database),
            ("gamma", Category::Vm),
        ] {
            let kind = match category {
                Category::Database => ResourceKind::Database,
                _ => ResourceKind::VirtualMachine,
            };
            registry
                .register(&running(kind), name, "", category, tags(&[("env", "prod")]))
                .unwrap();
        }

        let names = |entries: Vec<PrototypeEntry>| {
            entries.into_iter().map(|e| e.name).collect::<Vec<_>>()
        };
        assert_eq!(names(registry.list(None)), vec!["alpha", "beta", "gamma"]);
        assert_eq!(names(registry.list(Some(Category::Vm))), vec!["alpha", "gamma"]);
        assert_eq!(
            names(registry.search(&SearchQuery::new().tag("env", "prod").text("A"))),
            vec!["alpha", "beta", "gamma"]
        );
        assert_eq!(
            names(registry.search(&SearchQuery::new().category(Category::Database))),
            vec!["beta"]
        );
    }

    #[test]
    fn test_statistics_most_used_ties_go_to_earliest() {
        let registry = PrototypeRegistry::new();
        assert_eq!(registry.statistics().most_used, None);

        let first = registry
            .register(
                &running(ResourceKind::VirtualMachine),
                "first",
                "",
                Category::Vm,
                BTreeMap::new(),
            )
            .unwrap();
        let second = registry
            .register(
                &running(ResourceKind::LoadBalancer),
                "second",
                "",
                Category::Loadbalancer,
                BTreeMap::new(),
            )
            .unwrap();

        let stats = registry.statistics();
        assert_eq!(stats.total_prototypes, 2);
        assert_eq!(stats.most_used, None);

        registry.clone(&second, None, &BTreeMap::new()).unwrap();
        registry.clone(&first, None, &BTreeMap::new()).unwrap();

        let stats = registry.statistics();
        assert_eq!(stats.total_clones, 2);
        assert_eq!(stats.most_used.map(|leader| leader.id), Some(first));
        assert_eq!(stats.by_category[&Category::Loadbalancer].clones, 1);
        assert_eq!(stats.by_provider[&Provider::Aws], 2);
    }

    #[test]
    fn test_find_by_resource() {
        let registry = PrototypeRegistry::new();
        let resource = running(ResourceKind::VirtualMachine);
        let resource_id = read_shared(&resource).id.clone();
        assert!(registry.find_by_resource(&resource_id).is_none());

        let id = registry
            .register(&resource, "base", "", Category::Vm, BTreeMap::new())
            .unwrap();
        assert_eq!(registry.find_by_resource(&resource_id).map(|e| e.id), Some(id));
    }
}
