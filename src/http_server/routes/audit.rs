//! Audit log listing. Read-only by design; ADMIN only via the policy
//! table.

use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::AuditEntryWithActor;
use crate::http_server::server::AppState;
use crate::utils::errors::ApiResult;

/// Cap on one listing; the log itself is unbounded.
const MAX_ENTRIES: i64 = 100;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<AuditEntryWithActor>>> {
    let entries = state
        .store
        .list_audit_entries(&principal.company_id, MAX_ENTRIES)
        .await?;
    Ok(Json(entries))
}
