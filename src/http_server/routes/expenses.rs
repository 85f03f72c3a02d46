//! Expense handlers.
//!
//! Creation is a multipart form so the receipt file can ride along with
//! the fields; everything else is JSON.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::Principal;
use crate::domain::{Expense, ExpenseStatus, ExpenseWithSubmitter};
use crate::http_server::server::AppState;
use crate::store::expenses::NewExpense;
use crate::utils::errors::{ApiError, ApiResult};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<ExpenseWithSubmitter>>> {
    let expenses = state.store.list_expenses(&principal.company_id).await?;
    Ok(Json(expenses))
}

/// Parsed multipart form for expense creation.
#[derive(Default)]
struct ExpenseForm {
    amount: Option<f64>,
    currency: Option<String>,
    description: Option<String>,
    category: Option<String>,
    receipt: Option<(String, Option<String>, Bytes)>,
}

async fn read_form(mut multipart: Multipart) -> ApiResult<ExpenseForm> {
    let mut form = ExpenseForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "amount" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("failed to read amount: {}", e)))?;
                let parsed = text
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ApiError::Validation("amount must be a number".to_string()))?;
                form.amount = Some(parsed);
            }
            "currency" => {
                form.currency = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("failed to read currency: {}", e))
                })?);
            }
            "description" => {
                form.description = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("failed to read description: {}", e))
                })?);
            }
            "category" => {
                form.category = Some(field.text().await.map_err(|e| {
                    ApiError::Validation(format!("failed to read category: {}", e))
                })?);
            }
            "receipt" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Validation("receipt has no filename".to_string()))?;
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("failed to read receipt: {}", e))
                })?;
                form.receipt = Some((filename, content_type, data));
            }
            // Unknown fields are ignored, like any tolerant form endpoint.
            _ => {}
        }
    }

    Ok(form)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let form = read_form(multipart).await?;

    let amount = form
        .amount
        .ok_or_else(|| ApiError::Validation("amount is required".to_string()))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ApiError::Validation("amount must be positive".to_string()));
    }

    let receipt_url = match form.receipt {
        Some((filename, content_type, data)) => Some(
            state
                .receipts
                .save(&filename, content_type.as_deref(), data)
                .await?,
        ),
        None => None,
    };

    let expense = state
        .store
        .create_expense(NewExpense {
            amount,
            currency: form.currency.as_deref().unwrap_or("SAR"),
            description: form.description.as_deref(),
            category: form.category.as_deref(),
            receipt_url: receipt_url.as_deref(),
            user_id: &principal.user_id,
            company_id: &principal.company_id,
        })
        .await?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::CreateExpense,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({ "expenseId": expense.id, "amount": amount })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Expense>> {
    let status: ExpenseStatus = body.status.parse().map_err(ApiError::Validation)?;

    let expense = state
        .store
        .update_expense_status(&id, &principal.company_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("expense not found".to_string()))?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::UpdateExpenseStatus,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({ "expenseId": id, "status": status })),
        )
        .await;

    Ok(Json(expense))
}
