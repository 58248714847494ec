//! Tiered sizing: provider-independent director, provider-specific builders
//!
//! The director decides how big a tier is; a builder only knows how its
//! provider spells that size (field names, units, machine type names).

use crate::config::ResourceConfig;
use crate::error::{CloudError, Result};
use crate::kind::Provider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Abstract sizing bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Small,
    Medium,
    Large,
    Xlarge,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Small, Tier::Medium, Tier::Large, Tier::Xlarge];

    /// General-purpose (vCPU, memory GB) pair for this tier
    pub fn base_size(&self) -> (u32, u32) {
        match self {
            Tier::Small => (2, 8),
            Tier::Medium => (4, 16),
            Tier::Large => (8, 32),
            Tier::Xlarge => (16, 64),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Small => write!(f, "small"),
            Tier::Medium => write!(f, "medium"),
            Tier::Large => write!(f, "large"),
            Tier::Xlarge => write!(f, "xlarge"),
        }
    }
}

impl FromStr for Tier {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "small" => Ok(Tier::Small),
            "medium" => Ok(Tier::Medium),
            "large" => Ok(Tier::Large),
            "xlarge" => Ok(Tier::Xlarge),
            _ => Err(CloudError::Configuration(format!(
                "unknown tier '{s}' (expected small, medium, large or xlarge)"
            ))),
        }
    }
}

/// Sizing bias applied on top of a tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    General,
    Memory,
    Compute,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::General, Profile::Memory, Profile::Compute];
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::General => write!(f, "general"),
            Profile::Memory => write!(f, "memory"),
            Profile::Compute => write!(f, "compute"),
        }
    }
}

impl FromStr for Profile {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(Profile::General),
            "memory" => Ok(Profile::Memory),
            "compute" => Ok(Profile::Compute),
            _ => Err(CloudError::Configuration(format!(
                "unknown profile '{s}' (expected general, memory or compute)"
            ))),
        }
    }
}

/// Provider-agnostic size handed to a builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub vcpus: u32,
    pub memory_gb: u32,
    pub profile: Profile,
}

/// Provider-specific configuration builder
///
/// The director calls the steps in this order: `reset`, `set_identity`,
/// `set_size`, `set_image_and_network`, `build`. A builder is reused across
/// constructions, so `reset` must discard everything from the previous one.
pub trait TierBuilder: Send {
    fn provider(&self) -> Provider;

    fn reset(&mut self);

    fn set_identity(&mut self, name: &str, region: &str);

    fn set_size(&mut self, size: &SizeSpec);

    fn set_image_and_network(&mut self);

    /// Hand over the finished configuration
    fn build(&mut self) -> ResourceConfig;
}

/// Drives a [`TierBuilder`] and owns the tier and profile sizing rules
#[derive(Debug, Clone, Copy, Default)]
pub struct TierDirector;

impl TierDirector {
    pub fn new() -> Self {
        Self
    }

    /// Apply the profile skew to the tier's general-purpose size.
    ///
    /// Memory-biased sizes double the memory, compute-biased sizes halve it;
    /// the vCPU count is fixed by the tier.
    pub fn size_for(&self, tier: Tier, profile: Profile) -> SizeSpec {
        let (vcpus, memory_gb) = tier.base_size();
        let memory_gb = match profile {
            Profile::General => memory_gb,
            Profile::Memory => memory_gb * 2,
            Profile::Compute => memory_gb / 2,
        };
        SizeSpec {
            vcpus,
            memory_gb,
            profile,
        }
    }

    /// Build a provider-shaped configuration for `tier` and `profile`.
    ///
    /// `extra` is merged over the builder output. The abstract `vcpus` and
    /// `memory_gb` annotations are written last and always reflect the tier.
    pub fn construct(
        &self,
        builder: &mut dyn TierBuilder,
        name: &str,
        region: &str,
        tier: Tier,
        profile: Profile,
        extra: &ResourceConfig,
    ) -> ResourceConfig {
        let size = self.size_for(tier, profile);

        builder.reset();
        builder.set_identity(name, region);
        builder.set_size(&size);
        builder.set_image_and_network();
        let mut config = builder.build();

        config.merge(extra);
        config.insert("vcpus", size.vcpus);
        config.insert("memory_gb", size.memory_gb);

        tracing::debug!(
            "Built {} {}/{} config for '{}': {} vCPU, {} GB",
            builder.provider(),
            tier,
            profile,
            name,
            size.vcpus,
            size.memory_gb
        );
        config
    }
}
