//! Configuration loading and validation tests.

use mizan::config::{Config, ConfigManager, ConfigValidator};
use tempfile::TempDir;
use tokio::fs;

#[tokio::test]
async fn test_yaml_config_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    let content = r#"
server:
  host: 0.0.0.0
  port: 8080
auth:
  jwt_secret: prod-secret
  token_expiry_hours: 12
database:
  path: /var/lib/mizan/mizan.db
uploads:
  max_file_size_mb: 5
features:
  rate_limiting: false
"#;
    fs::write(&path, content).await.unwrap();

    let manager = ConfigManager::new(&path).await.unwrap();
    let config = manager.get_config();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.auth.jwt_secret, "prod-secret");
    assert_eq!(config.auth.token_expiry_hours, 12);
    assert_eq!(config.uploads.max_file_size_mb, 5);
    assert!(!config.features.rate_limiting);
    // Untouched sections keep their defaults.
    assert_eq!(config.database.max_connections, 5);
}

#[tokio::test]
async fn test_json_config_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"server": {"port": 9090}}"#)
        .await
        .unwrap();

    let manager = ConfigManager::new(&path).await.unwrap();
    assert_eq!(manager.get_config().server.port, 9090);
}

#[tokio::test]
async fn test_malformed_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    fs::write(&path, "server: [not, a, map]").await.unwrap();

    assert!(ConfigManager::new(&path).await.is_err());
}

#[test]
fn test_validator_accepts_production_shape() {
    let mut config = Config::default();
    config.auth.jwt_secret = "a-real-secret".to_string();

    let warnings = ConfigValidator::new().validate(&config).unwrap();
    assert!(warnings.is_empty());
}

#[test]
fn test_validator_flags_broken_config() {
    let mut config = Config::default();
    config.auth.jwt_secret = String::new();
    config.server.port = 0;
    config.database.max_connections = 0;

    let errors = ConfigValidator::new().validate(&config).unwrap_err();
    let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
    assert!(paths.contains(&"auth.jwt_secret"));
    assert!(paths.contains(&"server.port"));
    assert!(paths.contains(&"database.max_connections"));
}
