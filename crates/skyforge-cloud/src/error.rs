//! Skyforge core error types

use crate::kind::{Provider, ResourceKind};
use crate::resource::ResourceStatus;
use thiserror::Error;

/// Errors reported by the catalog, families, clone capability and registry.
///
/// None of these are fatal: each is reported to the immediate caller and
/// leaves shared state untouched.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error(
        "Validation failed for {provider} {kind}: missing mandatory fields [{}]",
        .missing_fields.join(", ")
    )]
    Validation {
        provider: Provider,
        kind: ResourceKind,
        missing_fields: Vec<String>,
    },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Resource {id} cannot be cloned or templated while {status}")]
    IneligibleState { id: String, status: ResourceStatus },

    #[error("Resource {resource_id} already backs prototype {prototype_id}")]
    AlreadyTemplated {
        resource_id: String,
        prototype_id: String,
    },

    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot {action} {kind} {id} while {status}")]
    InvalidTransition {
        id: String,
        kind: ResourceKind,
        status: ResourceStatus,
        action: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
