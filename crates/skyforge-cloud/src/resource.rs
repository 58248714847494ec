//! Provisioned resource instances and their lifecycle

use crate::error::{CloudError, Result};
use crate::kind::{Provider, ResourceKind};
use crate::naming;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handle shared by the store and the prototype registry.
///
/// Both reference the same entity; neither keeps a private copy.
pub type SharedResource = Arc<RwLock<Resource>>;

/// Acquire a read guard, recovering from a poisoned lock.
///
/// Writers finish every mutation before releasing the guard, so the data
/// behind a poisoned lock is still consistent.
pub fn read_shared(resource: &SharedResource) -> RwLockReadGuard<'_, Resource> {
    resource.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire a write guard, recovering from a poisoned lock.
pub fn write_shared(resource: &SharedResource) -> RwLockWriteGuard<'_, Resource> {
    resource.write().unwrap_or_else(PoisonError::into_inner)
}

/// Lifecycle status of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Resource is being created
    Creating,
    /// Resource is running/active
    Running,
    /// Resource is stopped
    Stopped,
    /// Passive resource (object store) ready for use
    Available,
    /// Resource has been terminated; absorbing
    Terminated,
}

impl ResourceStatus {
    /// Stable states from which a copy may be taken or a template registered
    pub fn is_clone_eligible(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Running | ResourceStatus::Stopped | ResourceStatus::Available
        )
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Creating => write!(f, "creating"),
            ResourceStatus::Running => write!(f, "running"),
            ResourceStatus::Stopped => write!(f, "stopped"),
            ResourceStatus::Available => write!(f, "available"),
            ResourceStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// Lifecycle actions driven from outside the core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Start,
    Stop,
    Restart,
    Terminate,
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleAction::Start => write!(f, "start"),
            LifecycleAction::Stop => write!(f, "stop"),
            LifecycleAction::Restart => write!(f, "restart"),
            LifecycleAction::Terminate => write!(f, "terminate"),
        }
    }
}

impl std::str::FromStr for LifecycleAction {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(LifecycleAction::Start),
            "stop" => Ok(LifecycleAction::Stop),
            "restart" => Ok(LifecycleAction::Restart),
            "terminate" => Ok(LifecycleAction::Terminate),
            _ => Err(CloudError::invalid_value("action", s)),
        }
    }
}

/// Clone bookkeeping embedded in every resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneMetadata {
    /// Id of the resource this one was cloned from; `None` for originals
    pub origin_id: Option<String>,

    /// Number of clones taken from this resource (not from its descendants)
    pub clone_count: u64,

    pub created_at: DateTime<Utc>,

    /// When this resource was produced by a clone; `None` for originals
    pub cloned_at: Option<DateTime<Utc>>,

    /// When this resource last served as a clone source
    pub last_cloned_at: Option<DateTime<Utc>>,

    pub is_template: bool,

    pub template_name: Option<String>,

    /// Ancestor ids, oldest first. Its length is the distance from the original.
    pub lineage: Vec<String>,
}

impl CloneMetadata {
    fn original(now: DateTime<Utc>) -> Self {
        Self {
            origin_id: None,
            clone_count: 0,
            created_at: now,
            cloned_at: None,
            last_cloned_at: None,
            is_template: false,
            template_name: None,
            lineage: Vec::new(),
        }
    }

    pub fn is_original(&self) -> bool {
        self.origin_id.is_none()
    }
}

/// A provisioned resource instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,

    /// Display name
    pub name: String,

    pub kind: ResourceKind,

    pub provider: Provider,

    pub region: String,

    /// Provider-native type label (e.g. "AWS::EC2::Instance")
    pub resource_type: String,

    pub status: ResourceStatus,

    pub tags: BTreeMap<String, String>,

    /// Provider-shaped configuration plus generated identifiers
    pub attributes: BTreeMap<String, Value>,

    pub metadata: CloneMetadata,
}

impl Resource {
    /// New resource in `creating` state with a fresh id
    pub fn new(
        provider: Provider,
        kind: ResourceKind,
        name: impl Into<String>,
        region: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            id: naming::resource_id(provider, kind),
            name: name.into(),
            kind,
            provider,
            region: region.into(),
            resource_type: resource_type.into(),
            status: ResourceStatus::Creating,
            tags: BTreeMap::new(),
            attributes: BTreeMap::new(),
            metadata: CloneMetadata::original(Utc::now()),
        }
    }

    pub fn into_shared(self) -> SharedResource {
        Arc::new(RwLock::new(self))
    }

    pub fn is_clone_eligible(&self) -> bool {
        self.status.is_clone_eligible()
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    fn invalid_transition(&self, action: impl Into<String>) -> CloudError {
        CloudError::InvalidTransition {
            id: self.id.clone(),
            kind: self.kind,
            status: self.status,
            action: action.into(),
        }
    }

    /// Creation finished: `creating` becomes `running`, or `available` for passive kinds
    pub fn mark_provisioned(&mut self) -> Result<()> {
        if self.status != ResourceStatus::Creating {
            return Err(self.invalid_transition("provision"));
        }
        self.status = if self.kind.is_passive() {
            ResourceStatus::Available
        } else {
            ResourceStatus::Running
        };
        tracing::debug!("{} {} is now {}", self.kind, self.id, self.status);
        Ok(())
    }

    /// Apply a lifecycle action. On error the resource is left unchanged.
    pub fn apply(&mut self, action: LifecycleAction) -> Result<()> {
        use ResourceStatus::*;

        if self.kind.is_passive() && action != LifecycleAction::Terminate {
            return Err(self.invalid_transition(action.to_string()));
        }

        let next = match (action, self.status) {
            (LifecycleAction::Start, Stopped | Creating) => Running,
            (LifecycleAction::Stop, Running) => Stopped,
            (LifecycleAction::Restart, Running) => Running,
            (LifecycleAction::Terminate, status) if status != Terminated => Terminated,
            _ => return Err(self.invalid_transition(action.to_string())),
        };

        tracing::debug!("{} {}: {} -> {}", self.kind, self.id, self.status, next);
        self.status = next;
        Ok(())
    }

    /// Allocate a public address for a virtual machine
    pub fn assign_public_address(&mut self) -> Result<String> {
        if self.kind != ResourceKind::VirtualMachine || self.status == ResourceStatus::Terminated {
            return Err(self.invalid_transition("assign a public address to"));
        }
        let address = naming::public_ip(self.provider);
        self.set_attribute("public_ip", address.clone());
        Ok(address)
    }

    fn require_live(&self, kind: ResourceKind, action: &str) -> Result<()> {
        if self.kind != kind || self.status == ResourceStatus::Terminated {
            return Err(self.invalid_transition(action));
        }
        Ok(())
    }

    /// Add a backend to a load balancer. Returns false if it was already a target.
    pub fn add_target(&mut self, target_id: &str) -> Result<bool> {
        self.require_live(ResourceKind::LoadBalancer, "add a target to")?;
        let targets = self
            .attributes
            .entry("targets".to_string())
            .or_insert_with(|| json!([]));
        if !targets.is_array() {
            *targets = json!([]);
        }
        let Some(list) = targets.as_array_mut() else {
            return Ok(false);
        };
        if list.iter().any(|t| t.as_str() == Some(target_id)) {
            return Ok(false);
        }
        list.push(json!(target_id));
        tracing::debug!("Load balancer {} now targets {}", self.id, target_id);
        Ok(true)
    }

    /// Remove a backend from a load balancer. Returns false if it was not a target.
    pub fn remove_target(&mut self, target_id: &str) -> Result<bool> {
        self.require_live(ResourceKind::LoadBalancer, "remove a target from")?;
        let Some(list) = self
            .attributes
            .get_mut("targets")
            .and_then(Value::as_array_mut)
        else {
            return Ok(false);
        };
        let before = list.len();
        list.retain(|t| t.as_str() != Some(target_id));
        Ok(list.len() != before)
    }

    /// Store an object under `key` in an object store, replacing any previous one
    pub fn put_object(&mut self, key: &str, size_bytes: u64) -> Result<()> {
        self.require_live(ResourceKind::ObjectStore, "put an object into")?;
        let storage_class = self
            .attribute("storage_class")
            .cloned()
            .unwrap_or(Value::Null);
        let objects = self
            .attributes
            .entry("objects".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !objects.is_object() {
            *objects = Value::Object(Map::new());
        }
        if let Some(map) = objects.as_object_mut() {
            map.insert(
                key.to_string(),
                json!({
                    "size": size_bytes,
                    "last_modified": Utc::now(),
                    "storage_class": storage_class,
                }),
            );
        }
        tracing::debug!("Stored {} ({} bytes) in {}", key, size_bytes, self.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm() -> Resource {
        Resource::new(
            Provider::Aws,
            ResourceKind::VirtualMachine,
            "web",
            "us-east-1",
            "AWS::EC2::Instance",
        )
    }

    #[test]
    fn test_new_resource_is_creating_original() {
        let resource = vm();
        assert_eq!(resource.status, ResourceStatus::Creating);
        assert!(resource.metadata.is_original());
        assert!(resource.metadata.lineage.is_empty());
        assert!(!resource.is_clone_eligible());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut resource = vm();
        resource.mark_provisioned().unwrap();
        assert_eq!(resource.status, ResourceStatus::Running);

        resource.apply(LifecycleAction::Stop).unwrap();
        assert_eq!(resource.status, ResourceStatus::Stopped);
        assert!(resource.is_clone_eligible());

        assert!(resource.apply(LifecycleAction::Stop).is_err());
        assert_eq!(resource.status, ResourceStatus::Stopped);

        resource.apply(LifecycleAction::Start).unwrap();
        resource.apply(LifecycleAction::Restart).unwrap();
        resource.apply(LifecycleAction::Terminate).unwrap();
        assert_eq!(resource.status, ResourceStatus::Terminated);
        assert!(resource.apply(LifecycleAction::Start).is_err());
        assert!(resource.apply(LifecycleAction::Terminate).is_err());
    }

    #[test]
    fn test_object_store_is_passive() {
        let mut bucket = Resource::new(
            Provider::Gcp,
            ResourceKind::ObjectStore,
            "assets",
            "us-central1",
            "gcp.storage.bucket",
        );
        bucket.mark_provisioned().unwrap();
        assert_eq!(bucket.status, ResourceStatus::Available);
        assert!(bucket.is_clone_eligible());

        let err = bucket.apply(LifecycleAction::Stop).unwrap_err();
        assert!(matches!(err, CloudError::InvalidTransition { .. }));
        bucket.apply(LifecycleAction::Terminate).unwrap();
    }

    #[test]
    fn test_mark_provisioned_only_from_creating() {
        let mut resource = vm();
        resource.mark_provisioned().unwrap();
        assert!(resource.mark_provisioned().is_err());
    }

    #[test]
    fn test_assign_public_address() {
        let mut resource = vm();
        let ip = resource.assign_public_address().unwrap();
        assert!(ip.starts_with("54."));
        assert_eq!(resource.attribute_str("public_ip"), Some(ip.as_str()));
    }

    #[test]
    fn test_load_balancer_targets() {
        let mut lb = Resource::new(
            Provider::Aws,
            ResourceKind::LoadBalancer,
            "edge",
            "us-east-1",
            "AWS::ElasticLoadBalancingV2::LoadBalancer",
        );
        assert!(lb.add_target("i-1").unwrap());
        assert!(lb.add_target("i-2").unwrap());
        assert!(!lb.add_target("i-1").unwrap());
        assert_eq!(lb.attribute("targets"), Some(&json!(["i-1", "i-2"])));

        assert!(lb.remove_target("i-1").unwrap());
        assert!(!lb.remove_target("i-9").unwrap());
        assert_eq!(lb.attribute("targets"), Some(&json!(["i-2"])));

        lb.apply(LifecycleAction::Terminate).unwrap();
        assert!(lb.add_target("i-3").is_err());
        assert!(vm().add_target("i-1").is_err());
    }

    #[test]
    fn test_put_object() {
        let mut bucket = Resource::new(
            Provider::Aws,
            ResourceKind::ObjectStore,
            "assets",
            "us-east-1",
            "AWS::S3::Bucket",
        );
        bucket.set_attribute("storage_class", "STANDARD");
        bucket.put_object("logo.png", 2048).unwrap();

        let object = &bucket.attribute("objects").unwrap()["logo.png"];
        assert_eq!(object["size"], 2048);
        assert_eq!(object["storage_class"], "STANDARD");
        assert!(vm().put_object("logo.png", 1).is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ResourceStatus::Available.to_string(), "available");
        assert_eq!(
            serde_json::to_string(&ResourceStatus::Terminated).unwrap(),
            "\"terminated\""
        );
    }
}
