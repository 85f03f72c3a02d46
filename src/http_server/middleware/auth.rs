//! Authentication and authorization middleware for the API routes

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::auth::{JwtAuth, PolicyTable, Principal, RouteId};
use crate::utils::errors::ApiError;

/// Extract the bearer token from request headers
fn extract_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer ").map(|v| v.to_string()))
}

/// Validates the bearer token and stores the resulting [`Principal`] in
/// request extensions for downstream handlers. Requests without a valid
/// token never reach a handler.
pub async fn auth_middleware(
    State(auth): State<Arc<JwtAuth>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&request) else {
        return ApiError::Unauthorized(
            "authorization header with bearer token is required".to_string(),
        )
        .into_response();
    };

    match auth.validate_token(&token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Role gate for one route. Admits the request only if the authenticated
/// principal's role is in the route's allow-list; otherwise the handler
/// does not execute. Missing authentication rejects before any role
/// evaluation.
pub async fn authorize_middleware(
    State((policy, route)): State<(PolicyTable, RouteId)>,
    request: Request,
    next: Next,
) -> Response {
    let Some(principal) = request.extensions().get::<Principal>() else {
        return ApiError::Unauthorized("authentication required".to_string()).into_response();
    };

    if !policy.admits(route, principal.role) {
        return ApiError::Forbidden(format!(
            "role {} may not perform this action",
            principal.role
        ))
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_extract_token_valid() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer test-token-123")
            .body(Body::empty())
            .unwrap();

        let token = extract_token(&request);
        assert_eq!(token, Some("test-token-123".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let token = extract_token(&request);
        assert_eq!(token, None);
    }

    #[test]
    fn test_extract_token_invalid_format() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let token = extract_token(&request);
        assert_eq!(token, None);
    }
}
