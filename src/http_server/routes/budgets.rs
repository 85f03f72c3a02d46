//! Budget handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::Principal;
use crate::domain::Budget;
use crate::http_server::server::AppState;
use crate::utils::errors::{ApiError, ApiResult};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Budget>>> {
    let budgets = state.store.list_budgets(&principal.company_id).await?;
    Ok(Json(budgets))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0.0, message = "amount cannot be negative"))]
    pub amount: f64,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateBudgetRequest>,
) -> ApiResult<(StatusCode, Json<Budget>)> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let budget = state
        .store
        .create_budget(&body.name, body.amount, &principal.company_id)
        .await?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::CreateBudget,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({
                "budgetId": budget.id,
                "name": budget.name,
                "amount": budget.amount,
            })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(budget)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub name: Option<String>,
    pub amount: Option<f64>,
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateBudgetRequest>,
) -> ApiResult<Json<Budget>> {
    if let Some(name) = &body.name {
        if name.is_empty() {
            return Err(ApiError::Validation("name cannot be empty".to_string()));
        }
    }
    if let Some(amount) = body.amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ApiError::Validation("amount cannot be negative".to_string()));
        }
    }

    let budget = state
        .store
        .update_budget(&id, &principal.company_id, body.name.as_deref(), body.amount)
        .await?
        .ok_or_else(|| ApiError::NotFound("budget not found".to_string()))?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::UpdateBudget,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({
                "budgetId": id,
                "name": body.name,
                "amount": body.amount,
            })),
        )
        .await;

    Ok(Json(budget))
}
