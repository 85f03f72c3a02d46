//! Security headers middleware
//!
//! Adds security headers to all HTTP responses to protect against
//! common web vulnerabilities.

use axum::{
    extract::{Request, State},
    http::header::{self, HeaderValue},
    middleware::Next,
    response::Response,
};
use tower_http::cors::CorsLayer;

/// Security headers configuration
#[derive(Debug, Clone)]
pub struct SecurityHeadersConfig {
    /// X-Frame-Options
    pub frame_options: FrameOptions,
    /// X-Content-Type-Options: nosniff
    pub content_type_options: bool,
    /// Strict-Transport-Security (HSTS)
    pub hsts: Option<HstsConfig>,
    /// Referrer-Policy
    pub referrer_policy: Option<String>,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            frame_options: FrameOptions::Deny,
            content_type_options: true,
            hsts: Some(HstsConfig::default()),
            referrer_policy: Some("strict-origin-when-cross-origin".to_string()),
        }
    }
}

/// X-Frame-Options header values
#[derive(Debug, Clone)]
pub enum FrameOptions {
    Deny,
    SameOrigin,
}

impl FrameOptions {
    fn to_header_value(&self) -> HeaderValue {
        match self {
            FrameOptions::Deny => HeaderValue::from_static("DENY"),
            FrameOptions::SameOrigin => HeaderValue::from_static("SAMEORIGIN"),
        }
    }
}

/// HSTS configuration
#[derive(Debug, Clone)]
pub struct HstsConfig {
    /// Max age in seconds
    pub max_age: u64,
    /// Include subdomains
    pub include_subdomains: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            max_age: 31536000, // 1 year
            include_subdomains: true,
        }
    }
}

impl HstsConfig {
    fn to_header_value(&self) -> HeaderValue {
        let mut value = format!("max-age={}", self.max_age);
        if self.include_subdomains {
            value.push_str("; includeSubDomains");
        }
        HeaderValue::from_str(&value)
            .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000"))
    }
}

/// Apply the configured security headers to every response
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_FRAME_OPTIONS, config.frame_options.to_header_value());

    if config.content_type_options {
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
    }

    if let Some(hsts) = &config.hsts {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, hsts.to_header_value());
    }

    if let Some(policy) = &config.referrer_policy {
        if let Ok(value) = HeaderValue::from_str(policy) {
            headers.insert(header::REFERRER_POLICY, value);
        }
    }

    response
}

/// CORS for the browser client: any origin, standard methods and headers.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::permissive()
}
