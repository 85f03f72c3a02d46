//! Audit trail for state-changing actions

pub mod recorder;

pub use recorder::{AuditAction, AuditEvent, AuditRecorder};
