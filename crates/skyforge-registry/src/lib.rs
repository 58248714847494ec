//! Prototype Registry: reusable resource templates
//!
//! A prototype is a named, categorized and tagged reference to a provisioned
//! resource. Cloning a prototype clones the resource behind it and records
//! usage on the entry.
//!
//! # Overview
//!
//! - **Registration**: eligible resources become templates at most once
//! - **Lookup**: `get`, `list`, `search` (substring, category and tag filters)
//! - **Cloning**: fresh resources with lineage back to the template
//! - **Statistics**: totals, most used prototype, per-category and per-provider counts
//!
//! One [`PrototypeRegistry`] is built at process start and passed by
//! reference (or `Arc`) to every consumer.

pub mod model;
pub mod registry;

pub use model::*;
pub use registry::*;
