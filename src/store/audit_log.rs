//! Audit log persistence.
//!
//! The audit_log table is append-only as far as the application is
//! concerned: this module exposes one INSERT and one company-scoped
//! SELECT, nothing else.

use sqlx::Row;

use crate::domain::{AuditActor, AuditEntry, AuditEntryWithActor};
use crate::store::{parse_datetime, Store, StoreError};

impl Store {
    pub async fn append_audit_entry(&self, entry: &AuditEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO audit_log (id, user_id, company_id, action, details, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.company_id)
        .bind(&entry.action)
        .bind(&entry.details)
        .bind(entry.created_at.to_rfc3339())
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Latest entries for one company, newest first, with the acting
    /// user joined in when the row still exists.
    pub async fn list_audit_entries(
        &self,
        company_id: &str,
        limit: i64,
    ) -> Result<Vec<AuditEntryWithActor>, StoreError> {
        let rows = sqlx::query(
            "SELECT a.*, u.first_name AS actor_first_name, u.last_name AS actor_last_name, \
                    u.email AS actor_email \
             FROM audit_log a \
             LEFT JOIN users u ON u.id = a.user_id \
             WHERE a.company_id = ?1 \
             ORDER BY a.created_at DESC \
             LIMIT ?2",
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let created_at_str: String = row.get("created_at");
                let actor_email: Option<String> = row.get("actor_email");

                Ok(AuditEntryWithActor {
                    entry: AuditEntry {
                        id: row.get("id"),
                        user_id: row.get("user_id"),
                        company_id: row.get("company_id"),
                        action: row.get("action"),
                        details: row.get("details"),
                        created_at: parse_datetime(&created_at_str)?,
                    },
                    user: actor_email.map(|email| AuditActor {
                        first_name: row.get("actor_first_name"),
                        last_name: row.get("actor_last_name"),
                        email,
                    }),
                })
            })
            .collect()
    }

    /// Total entry count for one company. Test and ops helper.
    pub async fn count_audit_entries(&self, company_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM audit_log WHERE company_id = ?1")
            .bind(company_id)
            .fetch_one(self.pool())
            .await?;

        Ok(row.get("n"))
    }
}
