//! Prototype Registry data model

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use skyforge_cloud::{CloudError, Provider, ResourceKind, SharedResource, read_shared};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Prototype category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Vm,
    Database,
    Loadbalancer,
    Storage,
    Network,
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vm,
        Category::Database,
        Category::Loadbalancer,
        Category::Storage,
        Category::Network,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vm => "vm",
            Category::Database => "database",
            Category::Loadbalancer => "loadbalancer",
            Category::Storage => "storage",
            Category::Network => "network",
            Category::General => "general",
        }
    }

    /// Natural category for a resource kind
    pub fn for_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::VirtualMachine => Category::Vm,
            ResourceKind::Database => Category::Database,
            ResourceKind::LoadBalancer => Category::Loadbalancer,
            ResourceKind::ObjectStore => Category::Storage,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CloudError::invalid_value("category", s))
    }
}

/// A registered prototype
///
/// `resource` is the same handle the store holds; the registry never copies
/// the entity behind it.
#[derive(Debug, Clone)]
pub struct PrototypeEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub tags: BTreeMap<String, String>,
    pub resource: SharedResource,
    pub created_at: DateTime<Utc>,
    pub usage_count: u64,

    /// None until the first clone
    pub last_used_at: Option<DateTime<Utc>>,
}

impl PrototypeEntry {
    pub fn resource_id(&self) -> String {
        read_shared(&self.resource).id.clone()
    }

    pub fn provider(&self) -> Provider {
        read_shared(&self.resource).provider
    }

    /// Case-insensitive substring match on name or description
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }

    /// Every given tag is present with an equal value
    pub fn has_tags(&self, tags: &BTreeMap<String, String>) -> bool {
        tags.iter()
            .all(|(key, value)| self.tags.get(key) == Some(value))
    }
}

impl Serialize for PrototypeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let resource = read_shared(&self.resource);
        let mut state = serializer.serialize_struct("PrototypeEntry", 10)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("resource_id", &resource.id)?;
        state.serialize_field("provider", &resource.provider)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("usage_count", &self.usage_count)?;
        state.serialize_field("last_used_at", &self.last_used_at)?;
        state.end()
    }
}

/// Search filters; every set filter must match
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub tags: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn matches(&self, entry: &PrototypeEntry) -> bool {
        self.text.as_deref().is_none_or(|text| entry.matches_text(text))
            && self.category.is_none_or(|category| entry.category == category)
            && entry.has_tags(&self.tags)
    }
}

/// The most cloned prototype
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageLeader {
    pub id: String,
    pub name: String,
    pub usage_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryStats {
    pub count: usize,
    pub clones: u64,
}

/// Registry statistics, computed on demand
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_prototypes: usize,

    /// Sum of usage counts
    pub total_clones: u64,
    pub most_used: Option<UsageLeader>,
    pub by_category: BTreeMap<Category, CategoryStats>,
    pub by_provider: BTreeMap<Provider, usize>,
}
