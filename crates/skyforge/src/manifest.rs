//! Apply manifests
//!
//! ```yaml
//! provider: aws
//! region: us-east-1          # optional, settings or provider default otherwise
//! namespace: vpc-main        # optional
//! resources:
//!   - name: web
//!     kind: vm
//!     tier: medium           # optional, virtual machines only
//!     profile: general
//!     config:
//!       security_groups: [sg-0a1b2c3d]
//!     actions: [stop, start]
//!     prototype:
//!       name: base-web
//!       description: Hardened web server
//!       category: vm
//!       tags: { env: prod }
//!       clones:
//!         - name: web-2
//!           tags: { env: staging }
//!       retire: false        # delete the prototype once its clones exist
//! ```

use anyhow::{Context, bail};
use serde::Deserialize;
use skyforge_cloud::{LifecycleAction, Provider, ResourceConfig, ResourceKind};
use skyforge_registry::Category;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub provider: Provider,
    pub region: Option<String>,
    pub namespace: Option<String>,
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSpec {
    pub name: String,
    pub kind: ResourceKind,
    pub tier: Option<String>,
    pub profile: Option<String>,
    #[serde(default)]
    pub config: ResourceConfig,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Applied in order once the resource is provisioned
    #[serde(default)]
    pub actions: Vec<LifecycleAction>,
    pub prototype: Option<PrototypeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrototypeSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<Category>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub clones: Vec<CloneSpec>,

    /// Delete the prototype after taking its clones
    #[serde(default)]
    pub retire: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloneSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid manifest {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.check()?;
        Ok(manifest)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.resources.is_empty() {
            bail!("manifest declares no resources");
        }

        let mut names = HashSet::new();
        for resource in &self.resources {
            if !names.insert(resource.name.as_str()) {
                bail!("duplicate resource name '{}'", resource.name);
            }
            if resource.tier.is_some() && resource.kind != ResourceKind::VirtualMachine {
                bail!(
                    "resource '{}': tier only applies to virtual machines, not {}",
                    resource.name,
                    resource.kind
                );
            }
            if resource.profile.is_some() && resource.tier.is_none() {
                bail!("resource '{}': profile requires a tier", resource.name);
            }
        }
        Ok(())
    }
}

impl PrototypeSpec {
    /// Explicit category, or the natural one for `kind`
    pub fn category_for(&self, kind: ResourceKind) -> Category {
        self.category.unwrap_or_else(|| Category::for_kind(kind))
    }
}
