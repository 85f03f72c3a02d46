//! Corporate card handlers.

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
use crate::domain::Card;
use crate::http_server::server::AppState;
use crate::utils::errors::{ApiError, ApiResult};

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<Card>>> {
    let cards = state.store.list_cards(&principal.company_id).await?;
    Ok(Json(cards))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    #[validate(length(equal = 4, message = "lastFour must be exactly 4 digits"))]
    pub last_four: String,
    #[validate(length(min = 1, message = "expiry is required"))]
    pub expiry: String,
    #[validate(range(min = 0.0, message = "limit cannot be negative"))]
    pub limit: f64,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(body): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if !body.last_four.chars().all(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "lastFour must be exactly 4 digits".to_string(),
        ));
    }

    let card = state
        .store
        .create_card(&body.last_four, &body.expiry, body.limit, &principal.company_id)
        .await?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::CreateCard,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({ "cardId": card.id, "lastFour": card.last_four })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(card)))
}

#[derive(Debug, Deserialize)]
pub struct ToggleCardRequest {
    pub active: bool,
}

pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(body): Json<ToggleCardRequest>,
) -> ApiResult<Json<Card>> {
    let card = state
        .store
        .set_card_active(&id, &principal.company_id, body.active)
        .await?
        .ok_or_else(|| ApiError::NotFound("card not found".to_string()))?;

    state
        .audit
        .record(
            AuditEvent::new(
                AuditAction::ToggleCardStatus,
                principal.user_id.as_str(),
                principal.company_id.as_str(),
            )
            .with_details(json!({ "cardId": id, "active": body.active })),
        )
        .await;

    Ok(Json(card))
}
