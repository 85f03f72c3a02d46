//! Corporate card queries.
//!
//! `credit_limit` is the SQL column for the JSON `limit` field; `active`
//! is a real boolean (INTEGER 0/1).

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::Card;
use crate::store::{parse_datetime, Store, StoreError};

fn card_from_row(row: &SqliteRow) -> Result<Card, StoreError> {
    let created_at_str: String = row.get("created_at");

    Ok(Card {
        id: row.get("id"),
        last_four: row.get("last_four"),
        expiry: row.get("expiry"),
        limit: row.get("credit_limit"),
        active: row.get("active"),
        company_id: row.get("company_id"),
        created_at: parse_datetime(&created_at_str)?,
    })
}

impl Store {
    pub async fn create_card(
        &self,
        last_four: &str,
        expiry: &str,
        limit: f64,
        company_id: &str,
    ) -> Result<Card, StoreError> {
        let card = Card {
            id: Uuid::new_v4().to_string(),
            last_four: last_four.to_string(),
            expiry: expiry.to_string(),
            limit,
            active: true,
            company_id: company_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO cards (id, last_four, expiry, credit_limit, active, company_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&card.id)
        .bind(&card.last_four)
        .bind(&card.expiry)
        .bind(card.limit)
        .bind(card.active)
        .bind(&card.company_id)
        .bind(card.created_at.to_rfc3339())
        .execute(self.pool())
        .await?;

        Ok(card)
    }

    pub async fn list_cards(&self, company_id: &str) -> Result<Vec<Card>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM cards WHERE company_id = ?1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(card_from_row).collect()
    }

    /// Freezes or unfreezes a card within the given company. Returns
    /// `None` when no such card exists for that tenant.
    pub async fn set_card_active(
        &self,
        id: &str,
        company_id: &str,
        active: bool,
    ) -> Result<Option<Card>, StoreError> {
        let result = sqlx::query(
            "UPDATE cards SET active = ?1 WHERE id = ?2 AND company_id = ?3",
        )
        .bind(active)
        .bind(id)
        .bind(company_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM cards WHERE id = ?1")
            .bind(id)
            .fetch_one(self.pool())
            .await?;

        card_from_row(&row).map(Some)
    }
}
