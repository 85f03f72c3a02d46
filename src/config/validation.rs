//! Configuration validation using JSON Schema

use crate::config::types::DEV_JWT_SECRET;
use crate::config::Config;
use schemars::schema_for;
use serde_json::Value;

/// Validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Configuration validator
pub struct ConfigValidator {
    schema: Value,
}

impl ConfigValidator {
    /// Create a new validator with the generated schema
    pub fn new() -> Self {
        let schema = schema_for!(Config);
        Self {
            schema: serde_json::to_value(&schema).unwrap_or_default(),
        }
    }

    /// Get the JSON Schema for the configuration
    pub fn get_schema(&self) -> &Value {
        &self.schema
    }

    /// Export the schema to a JSON string
    pub fn export_schema(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_default()
    }

    /// Validate a loaded configuration. Errors block startup; warnings
    /// are logged and tolerated.
    pub fn validate(&self, config: &Config) -> Result<Vec<String>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        self.validate_server(config, &mut errors);
        self.validate_auth(config, &mut errors, &mut warnings);
        self.validate_database(config, &mut errors);
        self.validate_uploads(config, &mut warnings);
        self.validate_rate_limit(config, &mut errors);

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors)
        }
    }

    fn validate_server(&self, config: &Config, errors: &mut Vec<ValidationError>) {
        if config.server.host.is_empty() {
            errors.push(ValidationError {
                path: "server.host".to_string(),
                message: "Host cannot be empty".to_string(),
            });
        }
        if config.server.port == 0 {
            errors.push(ValidationError {
                path: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }
    }

    fn validate_auth(
        &self,
        config: &Config,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<String>,
    ) {
        if config.auth.jwt_secret.is_empty() {
            errors.push(ValidationError {
                path: "auth.jwt_secret".to_string(),
                message: "JWT secret cannot be empty".to_string(),
            });
        } else if config.auth.jwt_secret == DEV_JWT_SECRET {
            warnings.push(
                "auth.jwt_secret is the built-in development secret; set a real one".to_string(),
            );
        }
        if config.auth.token_expiry_hours <= 0 {
            errors.push(ValidationError {
                path: "auth.token_expiry_hours".to_string(),
                message: "Token expiry must be positive".to_string(),
            });
        }
    }

    fn validate_database(&self, config: &Config, errors: &mut Vec<ValidationError>) {
        if config.database.path.is_empty() {
            errors.push(ValidationError {
                path: "database.path".to_string(),
                message: "Database path cannot be empty".to_string(),
            });
        }
        if config.database.max_connections == 0 {
            errors.push(ValidationError {
                path: "database.max_connections".to_string(),
                message: "Connection pool needs at least one connection".to_string(),
            });
        }
    }

    fn validate_uploads(&self, config: &Config, warnings: &mut Vec<String>) {
        if config.uploads.max_file_size_mb == 0 {
            warnings.push("uploads.max_file_size_mb is 0; every receipt upload will be rejected".to_string());
        }
    }

    fn validate_rate_limit(&self, config: &Config, errors: &mut Vec<ValidationError>) {
        if !config.features.rate_limiting {
            return;
        }
        if config.rate_limit.requests_per_minute == 0 || config.rate_limit.burst_size == 0 {
            errors.push(ValidationError {
                path: "rate_limit".to_string(),
                message: "Rate limit quota and burst must be positive when rate limiting is on"
                    .to_string(),
            });
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_with_secret_warning() {
        let warnings = ConfigValidator::new().validate(&Config::default()).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("jwt_secret"));
    }

    #[test]
    fn test_empty_secret_is_an_error() {
        let mut config = Config::default();
        config.auth.jwt_secret = String::new();

        let errors = ConfigValidator::new().validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.path == "auth.jwt_secret"));
    }

    #[test]
    fn test_zero_rate_limit_only_matters_when_enabled() {
        let mut config = Config::default();
        config.auth.jwt_secret = "prod-secret".to_string();
        config.rate_limit.requests_per_minute = 0;

        assert!(ConfigValidator::new().validate(&config).is_err());

        config.features.rate_limiting = false;
        assert!(ConfigValidator::new().validate(&config).is_ok());
    }

    #[test]
    fn test_schema_export_mentions_sections() {
        let schema = ConfigValidator::new().export_schema();
        assert!(schema.contains("jwt_secret"));
        assert!(schema.contains("max_file_size_mb"));
    }
}
