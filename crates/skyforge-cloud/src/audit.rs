//! Audit events for register, clone, create and delete actions

use crate::error::Result;
use crate::kind::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const REDACTED: &str = "***";
const SECRET_MARKERS: [&str; 6] = [
    "password",
    "secret",
    "token",
    "credential",
    "private_key",
    "api_key",
];

/// Kind of audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Register,
    Clone,
    Delete,
    Lifecycle,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Create => write!(f, "create"),
            AuditAction::Register => write!(f, "register"),
            AuditAction::Clone => write!(f, "clone"),
            AuditAction::Delete => write!(f, "delete"),
            AuditAction::Lifecycle => write!(f, "lifecycle"),
        }
    }
}

/// One audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub actor: String,
    pub action: AuditAction,
    pub resource_id: String,
    pub provider: Option<Provider>,
    pub success: bool,
    pub details: Value,
}

impl AuditEvent {
    pub fn new(
        actor: impl Into<String>,
        action: AuditAction,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            actor: actor.into(),
            action,
            resource_id: resource_id.into(),
            provider: None,
            success: true,
            details: Value::Object(Map::new()),
        }
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attach details; secret-bearing values are masked on the way in
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = redact(&details);
        self
    }

    /// Mark the action as failed, recording the error message
    pub fn failed(mut self, error: impl std::fmt::Display) -> Self {
        self.success = false;
        if let Value::Object(map) = &mut self.details {
            map.insert("error".to_string(), Value::String(error.to_string()));
        }
        self
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SECRET_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Copy of `value` with every value under a secret-bearing key masked
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, inner)| {
                    let masked = if is_secret_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact(inner)
                    };
                    (key.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

/// Append-only audit sink
pub trait AuditSink: Send + Sync {
    fn append(&self, event: AuditEvent) -> Result<()>;
}

/// Keeps events in memory; for tests and for printing a run summary
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuditSink for MemoryAuditLog {
    fn append(&self, event: AuditEvent) -> Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

/// Writes one JSON object per line to a file opened in append mode
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesAuditLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!("Opened audit log: {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonLinesAuditLog {
    fn append(&self, event: AuditEvent) -> Result<()> {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
