//! Budget queries.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::Budget;
use crate::store::{parse_datetime, Store, StoreError};

fn budget_from_row(row: &SqliteRow) -> Result<Budget, StoreError> {
    let created_at_str: String = row.get("created_at");

    Ok(Budget {
        id: row.get("id"),
        name: row.get("name"),
        amount: row.get("amount"),
        company_id: row.get("company_id"),
        created_at: parse_datetime(&created_at_str)?,
    })
}

impl Store {
    pub async fn create_budget(
        &self,
        name: &str,
        amount: f64,
        company_id: &str,
    ) -> Result<Budget, StoreError> {
        let budget = Budget {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            amount,
            company_id: company_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO budgets (id, name, amount, company_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&budget.id)
        .bind(&budget.name)
        .bind(budget.amount)
        .bind(&budget.company_id)
        .bind(budget.created_at.to_rfc3339())
        .execute(self.pool())
        .await?;

        Ok(budget)
    }

    pub async fn list_budgets(&self, company_id: &str) -> Result<Vec<Budget>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM budgets WHERE company_id = ?1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(budget_from_row).collect()
    }

    /// Partial update within the given company; absent fields keep their
    /// current value. Returns `None` when no such budget exists for that
    /// tenant.
    pub async fn update_budget(
        &self,
        id: &str,
        company_id: &str,
        name: Option<&str>,
        amount: Option<f64>,
    ) -> Result<Option<Budget>, StoreError> {
        let result = sqlx::query(
            "UPDATE budgets SET name = COALESCE(?1, name), amount = COALESCE(?2, amount) \
             WHERE id = ?3 AND company_id = ?4",
        )
        .bind(name)
        .bind(amount)
        .bind(id)
        .bind(company_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM budgets WHERE id = ?1")
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        budget_from_row(&row).map(Some)
    }
}
