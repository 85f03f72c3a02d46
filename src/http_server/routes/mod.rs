//! API route handlers, one module per resource.

pub mod audit;
pub mod auth;
pub mod budgets;
pub mod cards;
pub mod expenses;

use axum::response::Json as AxumJson;

/// Health check endpoint
pub async fn health() -> AxumJson<serde_json::Value> {
    AxumJson(serde_json::json!({
        "status": "ok",
        "message": "Mizan API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
