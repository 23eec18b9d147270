//! Audit trail collaborator.
//!
//! Recording is fire-and-forget: sinks return nothing and can never fail
//! a posting.

use std::sync::{Mutex, PoisonError};

use caravan_shared::types::{AuditRecordId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::Actor;

/// What was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Record created.
    Create,
    /// Record replaced or restored.
    Update,
    /// Record voided.
    Void,
    /// Record removed.
    Delete,
}

/// What it was done to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntity {
    /// A business transaction.
    Transaction,
    /// A manual journal entry.
    JournalEntry,
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    /// Record id.
    pub id: AuditRecordId,
    /// When the change happened.
    pub timestamp: DateTime<Utc>,
    /// Who made it.
    pub user_id: UserId,
    /// Their display name at the time.
    pub user_name: String,
    /// What was done.
    pub action: AuditAction,
    /// Kind of record changed.
    pub entity_type: AuditEntity,
    /// Id of the record changed.
    pub entity_id: String,
    /// Human-readable summary, including any reason given.
    pub details: String,
    /// JSON of the record before the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// JSON of the record after the change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

impl AuditRecord {
    /// Creates a record stamped now.
    #[must_use]
    pub fn new(
        actor: &Actor,
        action: AuditAction,
        entity_type: AuditEntity,
        entity_id: impl ToString,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: AuditRecordId::new(),
            timestamp: Utc::now(),
            user_id: actor.id,
            user_name: actor.name.clone(),
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            details: details.into(),
            old_value: None,
            new_value: None,
        }
    }

    /// Attaches before/after JSON.
    #[must_use]
    pub fn with_values(mut self, old_value: Option<String>, new_value: Option<String>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }
}

/// Receives audit records.
#[cfg_attr(test, mockall::automock)]
pub trait AuditSink {
    /// Records one entry. Must not panic.
    fn record(&self, record: AuditRecord);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAudit;

impl AuditSink for NoopAudit {
    fn record(&self, _record: AuditRecord) {}
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl AuditSink for TracingAudit {
    fn record(&self, record: AuditRecord) {
        tracing::info!(
            target: "caravan::audit",
            user = %record.user_name,
            action = ?record.action,
            entity = ?record.entity_type,
            entity_id = %record.entity_id,
            "{}",
            record.details
        );
    }
}

/// Collects records in memory until drained into a snapshot's audit log.
#[derive(Debug, Default)]
pub struct MemoryAudit {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAudit {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of the records collected so far.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Takes every collected record, leaving the collector empty.
    pub fn drain(&self) -> Vec<AuditRecord> {
        std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, record: AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}
