//! Best-effort audit recorder.
//!
//! Every mutating API operation appends exactly one entry, written after
//! the mutation commits and before the response is sent. The write is
//! best-effort: a persistence failure is logged and swallowed, never
//! surfaced to the caller, and no transaction spans the mutation and the
//! audit insert, so the two can diverge under failure.

use chrono::Utc;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::domain::AuditEntry;
use crate::store::Store;

/// Tag of an audited action, as stored in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Register,
    Login,
    CreateExpense,
    UpdateExpenseStatus,
    CreateBudget,
    UpdateBudget,
    CreateCard,
    ToggleCardStatus,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Login => "LOGIN",
            AuditAction::CreateExpense => "CREATE_EXPENSE",
            AuditAction::UpdateExpenseStatus => "UPDATE_EXPENSE_STATUS",
            AuditAction::CreateBudget => "CREATE_BUDGET",
            AuditAction::UpdateBudget => "UPDATE_BUDGET",
            AuditAction::CreateCard => "CREATE_CARD",
            AuditAction::ToggleCardStatus => "TOGGLE_CARD_STATUS",
        }
    }
}

/// An audit event waiting to be recorded.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub user_id: String,
    pub company_id: String,
    pub details: Option<Value>,
}

impl AuditEvent {
    pub fn new(
        action: AuditAction,
        user_id: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            action,
            user_id: user_id.into(),
            company_id: company_id.into(),
            details: None,
        }
    }

    /// Attach an opaque details payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Appends immutable audit records to the relational store.
#[derive(Clone)]
pub struct AuditRecorder {
    store: Store,
    enabled: bool,
}

impl AuditRecorder {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Append one record. Never fails the caller: persistence errors are
    /// logged and swallowed.
    pub async fn record(&self, event: AuditEvent) {
        if !self.enabled {
            return;
        }

        // Details become text as-is when already a string, JSON otherwise.
        let details = event.details.map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        });

        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            user_id: event.user_id,
            company_id: event.company_id,
            action: event.action.as_str().to_string(),
            details,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.append_audit_entry(&entry).await {
            error!(action = entry.action, error = %e, "failed to write audit entry");
        }
    }
}
