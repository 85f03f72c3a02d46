//! Shared helpers for router-level integration tests.
//!
//! Each test gets an in-memory SQLite store and a full application
//! router; requests go through `tower::ServiceExt::oneshot`, so the
//! whole middleware stack is exercised without binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

use mizan::auth::password;
use mizan::config::Config;
use mizan::domain::Role;
use mizan::http_server::{create_router, AppState};
use mizan::store::users::NewUser;
use mizan::store::{DatabasePool, Store};

pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub state: Arc<AppState>,
    _uploads: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let pool = DatabasePool::in_memory().await.unwrap();
    let store = Store::new(pool.pool().clone());

    let uploads = TempDir::new().unwrap();
    let mut config = Config::default();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.uploads.dir = uploads.path().to_string_lossy().to_string();
    // SmartIpKeyExtractor needs a peer address, which oneshot requests
    // do not have.
    config.features.rate_limiting = false;

    let state = Arc::new(AppState::new(config, store.clone()));
    state.receipts.init().await.unwrap();
    let router = create_router(state.clone());

    TestApp {
        router,
        store,
        state,
        _uploads: uploads,
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

const BOUNDARY: &str = "mizan-test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart POST with text fields and an optional file part
/// named `receipt`.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        write!(
            body,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        )
        .unwrap();
    }
    if let Some((filename, content_type, data)) = file {
        write!(
            body,
            "--{}\r\nContent-Disposition: form-data; name=\"receipt\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, filename, content_type
        )
        .unwrap();
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{}--\r\n", BOUNDARY).unwrap();

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body)).unwrap()
}

/// Register a company through the API; returns the response body.
pub async fn register(app: &TestApp, email: &str, company_name: &str) -> Value {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/register",
            None,
            &serde_json::json!({
                "email": email,
                "password": "s3cure-Pass!",
                "firstName": "Amal",
                "lastName": "Nasser",
                "companyName": company_name,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

/// Log in through the API; returns the bearer token.
pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            &serde_json::json!({ "email": email, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Insert a user directly into the store (registration only ever creates
/// ADMIN users) and return their id.
pub async fn seed_user(
    app: &TestApp,
    email: &str,
    plain_password: &str,
    role: Role,
    company_id: &str,
) -> String {
    let hash = password::hash_password(plain_password).unwrap();
    let user = app
        .store
        .create_user(NewUser {
            email,
            password_hash: &hash,
            first_name: "Test",
            last_name: "User",
            role,
            company_id,
        })
        .await
        .unwrap();
    user.id
}

/// The company id of the first registered admin with this email.
pub async fn company_of(app: &TestApp, email: &str) -> String {
    app.store
        .find_user_by_email(email)
        .await
        .unwrap()
        .unwrap()
        .company_id
}
