pub mod apply;
pub mod catalog;
pub mod create;
pub mod tier;

use anyhow::Context;
use skyforge_cloud::{AuditEvent, AuditSink, JsonLinesAuditLog, MemoryAuditLog};
use skyforge_config::Settings;

/// JSON-lines file sink when `audit_log` is configured, in-memory otherwise
pub fn open_audit_sink(settings: &Settings) -> anyhow::Result<Box<dyn AuditSink>> {
    match &settings.audit_log {
        Some(path) => {
            let log = JsonLinesAuditLog::open(path)
                .with_context(|| format!("failed to open audit log {}", path.display()))?;
            Ok(Box::new(log))
        }
        None => Ok(Box::new(MemoryAuditLog::new())),
    }
}

/// Append an event; a failing sink is logged and never aborts the command
pub fn record(sink: &dyn AuditSink, event: AuditEvent) {
    if let Err(e) = sink.append(event) {
        tracing::warn!("Failed to write audit event: {}", e);
    }
}
