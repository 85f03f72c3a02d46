//! HTTP server middleware

pub mod auth;
pub mod rate_limit;
pub mod security;
pub mod size_limit;

pub use auth::{auth_middleware, authorize_middleware};
pub use rate_limit::create_rate_limit_layer;
pub use security::{permissive_cors, security_headers_middleware, SecurityHeadersConfig};
pub use size_limit::{size_limit_middleware, SizeLimitConfig};
