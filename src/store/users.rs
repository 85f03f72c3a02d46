//! Company and user queries.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::{Company, Role, User};
use crate::store::{map_insert_error, parse_datetime, Store, StoreError};

/// Fields required to insert a user.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
    pub company_id: &'a str,
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    let role_str: String = row.get("role");
    let created_at_str: String = row.get("created_at");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        role: role_str.parse().map_err(StoreError::Serialization)?,
        company_id: row.get("company_id"),
        created_at: parse_datetime(&created_at_str)?,
    })
}

impl Store {
    pub async fn create_company(&self, name: &str) -> Result<Company, StoreError> {
        let company = Company {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO companies (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(&company.id)
            .bind(&company.name)
            .bind(company.created_at.to_rfc3339())
            .execute(self.pool())
            .await?;

        Ok(company)
    }

    pub async fn find_company(&self, id: &str) -> Result<Option<Company>, StoreError> {
        let row = sqlx::query("SELECT id, name, created_at FROM companies WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(|row| {
            let created_at_str: String = row.get("created_at");
            Ok(Company {
                id: row.get("id"),
                name: row.get("name"),
                created_at: parse_datetime(&created_at_str)?,
            })
        })
        .transpose()
    }

    /// Inserts a user. A conflicting email surfaces as
    /// `StoreError::Duplicate` via the UNIQUE constraint.
    pub async fn create_user(&self, new: NewUser<'_>) -> Result<User, StoreError> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: new.email.to_string(),
            password_hash: new.password_hash.to_string(),
            first_name: new.first_name.to_string(),
            last_name: new.last_name.to_string(),
            role: new.role,
            company_id: new.company_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, first_name, last_name, role, company_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(&user.company_id)
        .bind(user.created_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| map_insert_error(e, "email"))?;

        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }

    pub async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.map(|row| user_from_row(&row)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DatabasePool;

    async fn store() -> Store {
        let pool = DatabasePool::in_memory().await.unwrap();
        Store::new(pool.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = store().await;
        let company = store.create_company("Acme").await.unwrap();

        let user = store
            .create_user(NewUser {
                email: "admin@acme.example",
                password_hash: "$argon2id$stub",
                first_name: "Amal",
                last_name: "Nasser",
                role: Role::Admin,
                company_id: &company.id,
            })
            .await
            .unwrap();

        let found = store
            .find_user_by_email("admin@acme.example")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.company_id, company.id);

        assert!(store
            .find_user_by_email("nobody@acme.example")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = store().await;
        let company = store.create_company("Acme").await.unwrap();

        store
            .create_user(NewUser {
                email: "admin@acme.example",
                password_hash: "$argon2id$stub",
                first_name: "Amal",
                last_name: "Nasser",
                role: Role::Admin,
                company_id: &company.id,
            })
            .await
            .unwrap();

        let err = store
            .create_user(NewUser {
                email: "admin@acme.example",
                password_hash: "$argon2id$stub",
                first_name: "Rami",
                last_name: "Saleh",
                role: Role::Employee,
                company_id: &company.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }
}
