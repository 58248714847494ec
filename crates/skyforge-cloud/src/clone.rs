//! Clone capability shared by every resource kind
//!
//! The copy itself is plain `Clone` on owned data, so a clone never shares
//! mutable state with its source. What differs per kind is which attributes
//! are copied, regenerated or cleared; each kind supplies those rules and
//! [`Cloneable`] does the identity and metadata bookkeeping.

use crate::error::{CloudError, Result};
use crate::kind::ResourceKind;
use crate::naming;
use crate::resource::{Resource, ResourceStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// What happens to an attribute when its resource is cloned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldAction {
    /// Carry the value over unchanged
    Copy,
    /// Replace with a freshly generated unique value
    Regenerate,
    /// Reset to an unallocated value (`"unassigned"`, `[]`, `{}`)
    Clear,
}

/// Per-field overrides of the kind defaults
///
/// ```
/// use skyforge_cloud::{ClonePolicy, FieldAction};
///
/// let policy = ClonePolicy::new().with("security_groups", FieldAction::Regenerate);
/// assert_eq!(policy.override_for("security_groups"), Some(FieldAction::Regenerate));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClonePolicy {
    overrides: BTreeMap<String, FieldAction>,
}

impl ClonePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, action: FieldAction) -> Self {
        self.overrides.insert(field.into(), action);
        self
    }

    pub fn override_for(&self, field: &str) -> Option<FieldAction> {
        self.overrides.get(field).copied()
    }

    /// Effective action for a field of the given kind
    pub fn action_for(&self, kind: ResourceKind, field: &str) -> FieldAction {
        self.override_for(field)
            .or_else(|| {
                rules_for(kind)
                    .default_actions()
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, action)| *action)
            })
            .unwrap_or(FieldAction::Copy)
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Field-level clone rules for one resource kind
pub trait KindCloneRules: Send + Sync {
    fn kind(&self) -> ResourceKind;

    /// Attributes whose default action is not a plain copy
    fn default_actions(&self) -> &'static [(&'static str, FieldAction)];

    /// Fresh value for `field` on the (already re-identified) clone.
    /// `None` falls back to regenerating prefixed references.
    fn regenerate(&self, _field: &str, _clone: &Resource) -> Option<Value> {
        None
    }

    fn cleared(&self, _field: &str, current: &Value) -> Value {
        cleared_value(current)
    }
}

struct VirtualMachineRules;
struct DatabaseRules;
struct LoadBalancerRules;
struct ObjectStoreRules;

impl KindCloneRules for VirtualMachineRules {
    fn kind(&self) -> ResourceKind {
        ResourceKind::VirtualMachine
    }

    fn default_actions(&self) -> &'static [(&'static str, FieldAction)] {
        &[
            ("private_ip", FieldAction::Regenerate),
            ("public_ip", FieldAction::Clear),
            ("security_groups", FieldAction::Copy),
        ]
    }

    fn regenerate(&self, field: &str, clone: &Resource) -> Option<Value> {
        match field {
            "private_ip" => Some(json!(naming::private_ip())),
            "public_ip" => Some(json!(naming::public_ip(clone.provider))),
            _ => None,
        }
    }
}

impl KindCloneRules for DatabaseRules {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Database
    }

    fn default_actions(&self) -> &'static [(&'static str, FieldAction)] {
        &[("endpoint", FieldAction::Regenerate)]
    }

    fn regenerate(&self, field: &str, clone: &Resource) -> Option<Value> {
        (field == "endpoint").then(|| {
            json!(naming::host_name(
                clone.provider,
                clone.kind,
                &clone.name,
                &clone.region
            ))
        })
    }
}

impl KindCloneRules for LoadBalancerRules {
    fn kind(&self) -> ResourceKind {
        ResourceKind::LoadBalancer
    }

    fn default_actions(&self) -> &'static [(&'static str, FieldAction)] {
        &[
            ("dns_name", FieldAction::Regenerate),
            ("targets", FieldAction::Clear),
            ("listeners", FieldAction::Copy),
        ]
    }

    fn regenerate(&self, field: &str, clone: &Resource) -> Option<Value> {
        (field == "dns_name").then(|| {
            json!(naming::host_name(
                clone.provider,
                clone.kind,
                &clone.name,
                &clone.region
            ))
        })
    }
}

impl KindCloneRules for ObjectStoreRules {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ObjectStore
    }

    fn default_actions(&self) -> &'static [(&'static str, FieldAction)] {
        &[
            ("bucket_name", FieldAction::Regenerate),
            ("objects", FieldAction::Clear),
        ]
    }

    fn regenerate(&self, field: &str, clone: &Resource) -> Option<Value> {
        (field == "bucket_name").then(|| json!(naming::bucket_name(&clone.name)))
    }
}

pub fn rules_for(kind: ResourceKind) -> &'static dyn KindCloneRules {
    match kind {
        ResourceKind::VirtualMachine => &VirtualMachineRules,
        ResourceKind::Database => &DatabaseRules,
        ResourceKind::LoadBalancer => &LoadBalancerRules,
        ResourceKind::ObjectStore => &ObjectStoreRules,
    }
}

/// Unallocated value of the same shape as `current`
fn cleared_value(current: &Value) -> Value {
    match current {
        Value::String(_) => json!("unassigned"),
        Value::Array(_) => json!([]),
        Value::Object(_) => json!({}),
        Value::Bool(_) => json!(false),
        Value::Number(_) => json!(0),
        Value::Null => Value::Null,
    }
}

/// Regenerate prefixed references: a string or a list of strings
fn regenerate_references(current: &Value) -> Value {
    match current {
        Value::String(s) => json!(naming::regenerate_reference(s)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => json!(naming::regenerate_reference(s)),
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Capability to produce an independent, re-identified copy
pub trait Cloneable {
    /// Clone under explicit per-field overrides, optionally under a new
    /// display name. Name-derived identifiers follow the new name.
    fn clone_as(&mut self, policy: &ClonePolicy, new_name: Option<&str>) -> Result<Resource>;

    /// Clone under explicit per-field overrides
    fn clone_with_policy(&mut self, policy: &ClonePolicy) -> Result<Resource> {
        self.clone_as(policy, None)
    }

    /// Clone under the kind's default rules
    fn clone_resource(&mut self) -> Result<Resource> {
        self.clone_with_policy(&ClonePolicy::default())
    }
}

/// Attributes that echo the display name
const NAME_ATTRIBUTES: [&str; 2] = ["name", "display_name"];

impl Cloneable for Resource {
    fn clone_as(&mut self, policy: &ClonePolicy, new_name: Option<&str>) -> Result<Resource> {
        if !self.is_clone_eligible() {
            return Err(CloudError::IneligibleState {
                id: self.id.clone(),
                status: self.status,
            });
        }

        let now = Utc::now();
        let rules = rules_for(self.kind);

        let mut copy = self.clone();
        copy.id = naming::resource_id(self.provider, self.kind);
        if let Some(name) = new_name {
            copy.name = name.to_string();
            for key in NAME_ATTRIBUTES {
                if copy.attribute_str(key) == Some(self.name.as_str()) {
                    copy.set_attribute(key, name);
                }
            }
        }

        let fields: BTreeSet<String> = rules
            .default_actions()
            .iter()
            .map(|(name, _)| name.to_string())
            .chain(policy.overrides.keys().cloned())
            .collect();

        for field in fields {
            let Some(current) = copy.attributes.get(&field).cloned() else {
                continue;
            };
            let next = match policy.action_for(self.kind, &field) {
                FieldAction::Copy => continue,
                FieldAction::Regenerate => rules
                    .regenerate(&field, &copy)
                    .unwrap_or_else(|| regenerate_references(&current)),
                FieldAction::Clear => rules.cleared(&field, &current),
            };
            copy.attributes.insert(field, next);
        }

        copy.status = ResourceStatus::Creating;

        let mut lineage = self.metadata.lineage.clone();
        lineage.push(self.id.clone());
        copy.metadata.origin_id = Some(self.id.clone());
        copy.metadata.clone_count = 0;
        copy.metadata.created_at = now;
        copy.metadata.cloned_at = Some(now);
        copy.metadata.last_cloned_at = None;
        copy.metadata.is_template = false;
        copy.metadata.template_name = None;
        copy.metadata.lineage = lineage;

        self.metadata.clone_count += 1;
        self.metadata.last_cloned_at = Some(now);

        tracing::debug!(
            "Cloned {} {} -> {} (generation {})",
            self.kind,
            self.id,
            copy.id,
            copy.metadata.lineage.len()
        );
        Ok(copy)
    }
}
