//! Skyforge Cloud Core
//!
//! This crate provides the provider-independent core of Skyforge:
//! the resource catalog, resource families, tiered sizing and the
//! clone capability every resource carries.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            client intent (tier, profile)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │  TierDirector ──drives──▶ TierBuilder (per prov) │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ResourceConfig
//! ┌─────────────────▼───────────────────────────────┐
//! │  ProviderResourceFamily ──validates──▶ Catalog   │
//! └─────────────────┬───────────────────────────────┘
//!                   │ Resource (creating)
//!         ┌─────────▼─────────┐   ┌────────────────┐
//!         │  ResourceStore    │◀──│ clone_resource │
//!         └───────────────────┘   └────────────────┘
//! ```

pub mod audit;
pub mod catalog;
pub mod clone;
pub mod config;
pub mod error;
pub mod family;
pub mod kind;
pub mod naming;
pub mod resource;
pub mod store;
pub mod tier;

// Re-exports
pub use audit::{AuditAction, AuditEvent, AuditSink, JsonLinesAuditLog, MemoryAuditLog};
pub use catalog::{FieldSpec, ResourceKindCatalog};
pub use clone::{Cloneable, ClonePolicy, FieldAction};
pub use config::ResourceConfig;
pub use error::{CloudError, Result};
pub use family::{FamilyBase, FamilyContext, ProviderResourceFamily};
pub use kind::{Provider, ResourceKind};
pub use resource::{
    CloneMetadata, LifecycleAction, Resource, ResourceStatus, SharedResource, read_shared,
    write_shared,
};
pub use store::{InMemoryStore, ResourceStore};
pub use tier::{Profile, SizeSpec, Tier, TierBuilder, TierDirector};
