//! SQLite persistence layer.
//!
//! A single [`Store`] facade wraps the connection pool; the query
//! implementations are split per entity (`users`, `expenses`, `budgets`,
//! `cards`, `audit_log`). Timestamps are stored as RFC 3339 TEXT, ids as
//! TEXT UUIDs, enums via their wire-string representation.

pub mod audit_log;
pub mod budgets;
pub mod cards;
pub mod expenses;
pub mod pool;
pub mod users;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

pub use pool::DatabasePool;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("duplicate {0}")]
    Duplicate(String),

    #[error("row not found")]
    NotFound,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Tenant-scoped data access over a SQLite pool.
///
/// Every read and write that touches tenant data takes a `company_id` and
/// carries it into the SQL, so rows never leak across companies.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Parse a DateTime<Utc> from an ISO 8601 string
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite default format, without timezone
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| StoreError::Serialization(format!("Failed to parse datetime '{}': {}", s, e)))
}

/// Map a sqlx error, surfacing UNIQUE violations as duplicates
pub(crate) fn map_insert_error(e: sqlx::Error, what: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(what.to_string())
        }
        _ => StoreError::Query(e),
    }
}
