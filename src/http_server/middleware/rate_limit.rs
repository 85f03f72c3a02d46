//! Rate limiting for the credential endpoints using tower-governor

use std::sync::Arc;
use std::time::Duration;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;

use crate::config::types::RateLimitConfig;

/// Per-client-IP rate limit layer for the login/register routes.
pub fn create_rate_limit_layer(
    config: &RateLimitConfig,
) -> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>> {
    let per_minute = config.requests_per_minute.max(1);
    let period = Duration::from_secs(60) / per_minute;

    let governor = GovernorConfigBuilder::default()
        .period(period)
        .burst_size(config.burst_size.max(1))
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to create governor config");

    GovernorLayer {
        config: Arc::new(governor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_builds_from_defaults() {
        let _layer = create_rate_limit_layer(&RateLimitConfig::default());
    }

    #[test]
    fn test_zero_quota_is_clamped() {
        let config = RateLimitConfig {
            requests_per_minute: 0,
            burst_size: 0,
        };
        let _layer = create_rate_limit_layer(&config);
    }
}
