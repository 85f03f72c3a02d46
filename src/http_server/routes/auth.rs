//! Registration and login handlers.
//!
//! Registration creates the tenant: one company plus its first (ADMIN)
//! user. Login failures are indistinguishable between unknown email and
//! wrong password.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::audit::{AuditAction, AuditEvent};
use crate::auth::{password, Principal};
use crate::domain::Role;
use crate::http_server::server::AppState;
use crate::store::users::NewUser;
use crate::utils::errors::{ApiError, ApiResult};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "company name is required"))]
    pub company_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    body.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    if state.store.find_user_by_email(&body.email).await?.is_some() {
        return Err(ApiError::Duplicate("email already in use".to_string()));
    }

    let company = state.store.create_company(&body.company_name).await?;
    let password_hash = password::hash_password(&body.password)?;

    let user = state
        .store
        .create_user(NewUser {
            email: &body.email,
            password_hash: &password_hash,
            first_name: &body.first_name,
            last_name: &body.last_name,
            role: Role::Admin,
            company_id: &company.id,
        })
        .await?;

    state
        .audit
        .record(
            AuditEvent::new(AuditAction::Register, user.id.as_str(), company.id.as_str())
                .with_details(json!({ "email": user.email })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful".to_string(),
            user: RegisteredUser {
                id: user.id,
                email: user.email,
                role: user.role,
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub company_name: String,
}

fn invalid_credentials() -> ApiError {
    // One message for unknown email and wrong password alike.
    ApiError::Unauthorized("invalid credentials".to_string())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .store
        .find_user_by_email(&body.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&body.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let company = state
        .store
        .find_company(&user.company_id)
        .await?
        .ok_or_else(|| ApiError::InternalError("company missing for user".to_string()))?;

    let principal = Principal::from_user(&user);
    let tokens = state.auth.generate_token(&principal)?;

    state
        .audit
        .record(AuditEvent::new(
            AuditAction::Login,
            user.id.as_str(),
            user.company_id.as_str(),
        ))
        .await;

    Ok(Json(LoginResponse {
        token: tokens.access_token,
        user: LoginUser {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            company_name: company.name,
        },
    }))
}
