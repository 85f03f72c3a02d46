//! Request size limit middleware
//!
//! Rejects requests whose declared body or headers exceed the configured
//! limits before any handler work happens. The receipt store enforces the
//! exact per-file cap; this guard bounds the request as a whole.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::utils::errors::ApiError;

/// Size limit configuration
#[derive(Debug, Clone, Copy)]
pub struct SizeLimitConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Maximum header size in bytes
    pub max_header_size: usize,
}

impl Default for SizeLimitConfig {
    fn default() -> Self {
        Self {
            max_request_size: 11 * 1024 * 1024, // 10 MB receipt + form overhead
            max_header_size: 64 * 1024,
        }
    }
}

impl SizeLimitConfig {
    /// Budget for a multipart upload of at most `max_file_size_mb`, with
    /// a megabyte of headroom for the other form fields.
    pub fn for_upload_limit(max_file_size_mb: u64) -> Self {
        Self {
            max_request_size: ((max_file_size_mb + 1) as usize) * 1024 * 1024,
            ..Self::default()
        }
    }
}

/// Size limit middleware
pub async fn size_limit_middleware(
    State(config): State<SizeLimitConfig>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers_size = request
        .headers()
        .iter()
        .map(|(k, v)| k.as_str().len() + v.len())
        .sum::<usize>();

    if headers_size > config.max_header_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "headers too large: {} bytes (limit: {} bytes)",
            headers_size, config.max_header_size
        )));
    }

    if let Some(content_length) = request.headers().get("content-length") {
        if let Ok(length_str) = content_length.to_str() {
            if let Ok(length) = length_str.parse::<usize>() {
                if length > config.max_request_size {
                    return Err(ApiError::PayloadTooLarge(format!(
                        "request body too large: {} bytes (limit: {} bytes)",
                        length, config.max_request_size
                    )));
                }
            }
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SizeLimitConfig::default();
        assert_eq!(config.max_request_size, 11 * 1024 * 1024);
        assert_eq!(config.max_header_size, 64 * 1024);
    }

    #[test]
    fn test_for_upload_limit_adds_headroom() {
        let config = SizeLimitConfig::for_upload_limit(10);
        assert_eq!(config.max_request_size, 11 * 1024 * 1024);
    }
}
