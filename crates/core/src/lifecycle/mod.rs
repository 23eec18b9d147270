//! Transaction lifecycle: create, edit, void, delete, restore.
//!
//! Every transition reverses the old journal effect before anything new
//! is posted, and every successful change leaves an audit record.

pub mod audit;
pub mod engine;
pub mod policy;
pub mod types;

pub use audit::{AuditAction, AuditEntity, AuditRecord, AuditSink, MemoryAudit, NoopAudit, TracingAudit};
pub use engine::PostingEngine;
pub use policy::LifecyclePolicy;
pub use types::{Actor, LifecycleAction, Role, TransactionState};
