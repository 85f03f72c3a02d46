//! Expense queries. Listings embed the submitting user.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::{Expense, ExpenseStatus, ExpenseWithSubmitter, Submitter};
use crate::store::{parse_datetime, Store, StoreError};

/// Fields required to insert an expense. Status always starts PENDING.
pub struct NewExpense<'a> {
    pub amount: f64,
    pub currency: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub receipt_url: Option<&'a str>,
    pub user_id: &'a str,
    pub company_id: &'a str,
}

fn expense_from_row(row: &SqliteRow) -> Result<Expense, StoreError> {
    let status_str: String = row.get("status");
    let created_at_str: String = row.get("created_at");

    Ok(Expense {
        id: row.get("id"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        description: row.get("description"),
        category: row.get("category"),
        receipt_url: row.get("receipt_url"),
        status: status_str.parse().map_err(StoreError::Serialization)?,
        user_id: row.get("user_id"),
        company_id: row.get("company_id"),
        created_at: parse_datetime(&created_at_str)?,
    })
}

impl Store {
    pub async fn create_expense(&self, new: NewExpense<'_>) -> Result<Expense, StoreError> {
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            amount: new.amount,
            currency: new.currency.to_string(),
            description: new.description.map(str::to_string),
            category: new.category.map(str::to_string),
            receipt_url: new.receipt_url.map(str::to_string),
            status: ExpenseStatus::Pending,
            user_id: new.user_id.to_string(),
            company_id: new.company_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO expenses (id, amount, currency, description, category, receipt_url, status, user_id, company_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&expense.id)
        .bind(expense.amount)
        .bind(&expense.currency)
        .bind(&expense.description)
        .bind(&expense.category)
        .bind(&expense.receipt_url)
        .bind(expense.status.as_str())
        .bind(&expense.user_id)
        .bind(&expense.company_id)
        .bind(expense.created_at.to_rfc3339())
        .execute(self.pool())
        .await?;

        Ok(expense)
    }

    /// Lists a company's expenses, newest first, with the submitting user.
    pub async fn list_expenses(
        &self,
        company_id: &str,
    ) -> Result<Vec<ExpenseWithSubmitter>, StoreError> {
        let rows = sqlx::query(
            "SELECT e.*, u.id AS submitter_id, u.first_name AS submitter_first_name, \
                    u.last_name AS submitter_last_name, u.email AS submitter_email \
             FROM expenses e \
             JOIN users u ON u.id = e.user_id \
             WHERE e.company_id = ?1 \
             ORDER BY e.created_at DESC",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ExpenseWithSubmitter {
                    expense: expense_from_row(row)?,
                    user: Submitter {
                        id: row.get("submitter_id"),
                        first_name: row.get("submitter_first_name"),
                        last_name: row.get("submitter_last_name"),
                        email: row.get("submitter_email"),
                    },
                })
            })
            .collect()
    }

    /// Updates an expense's status within the given company. Returns
    /// `None` when no such expense exists for that tenant.
    pub async fn update_expense_status(
        &self,
        id: &str,
        company_id: &str,
        status: ExpenseStatus,
    ) -> Result<Option<Expense>, StoreError> {
        let result = sqlx::query(
            "UPDATE expenses SET status = ?1 WHERE id = ?2 AND company_id = ?3",
        )
        .bind(status.as_str())
        .bind(id)
        .bind(company_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?1")
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        expense_from_row(&row).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::store::users::NewUser;
    use crate::store::DatabasePool;

    async fn seed() -> (Store, String, String) {
        let pool = DatabasePool::in_memory().await.unwrap();
        let store = Store::new(pool.pool().clone());
        let company = store.create_company("Acme").await.unwrap();
        let user = store
            .create_user(NewUser {
                email: "emp@acme.example",
                password_hash: "$argon2id$stub",
                first_name: "Rami",
                last_name: "Saleh",
                role: Role::Employee,
                company_id: &company.id,
            })
            .await
            .unwrap();
        (store, company.id, user.id)
    }

    #[tokio::test]
    async fn test_create_and_list_expenses() {
        let (store, company_id, user_id) = seed().await;

        let created = store
            .create_expense(NewExpense {
                amount: 120.0,
                currency: "SAR",
                description: Some("Taxi"),
                category: Some("Travel"),
                receipt_url: None,
                user_id: &user_id,
                company_id: &company_id,
            })
            .await
            .unwrap();
        assert_eq!(created.status, ExpenseStatus::Pending);

        let listed = store.list_expenses(&company_id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].expense.id, created.id);
        assert_eq!(listed[0].user.email, "emp@acme.example");

        // Another tenant sees nothing.
        let other = store.create_company("Globex").await.unwrap();
        assert!(store.list_expenses(&other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_update_is_tenant_scoped() {
        let (store, company_id, user_id) = seed().await;

        let expense = store
            .create_expense(NewExpense {
                amount: 75.5,
                currency: "SAR",
                description: None,
                category: None,
                receipt_url: None,
                user_id: &user_id,
                company_id: &company_id,
            })
            .await
            .unwrap();

        let updated = store
            .update_expense_status(&expense.id, &company_id, ExpenseStatus::Approved)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, ExpenseStatus::Approved);

        // The same id through another company is not visible.
        let other = store.create_company("Globex").await.unwrap();
        let missed = store
            .update_expense_status(&expense.id, &other.id, ExpenseStatus::Rejected)
            .await
            .unwrap();
        assert!(missed.is_none());
    }
}
