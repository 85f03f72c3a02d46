use crate::config::Config;
use crate::utils::errors::{ApiError, ApiResult};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Supported config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension and content
    pub fn detect(path: &PathBuf, content: &str) -> Self {
        let ext = path.extension().and_then(|ext| ext.to_str());

        match ext {
            Some("json") => ConfigFormat::Json,
            Some("yml") | Some("yaml") => ConfigFormat::Yaml,
            _ => {
                if content.trim_start().starts_with('{') {
                    ConfigFormat::Json
                } else {
                    ConfigFormat::Yaml
                }
            }
        }
    }

    /// Detect format from file extension only
    pub fn from_path(path: &PathBuf) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ConfigEvent {
    Reloaded,
    Error(String),
}

/// Loads the config file, keeps a shared snapshot, and reloads it when
/// the file changes on disk.
pub struct ConfigManager {
    path: PathBuf,
    format: ConfigFormat,
    config: Arc<RwLock<Config>>,
    event_tx: broadcast::Sender<ConfigEvent>,
    _watcher: RecommendedWatcher,
}

impl ConfigManager {
    pub async fn new(path: impl Into<PathBuf>) -> ApiResult<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ApiError::ConfigError(format!("Failed to read config: {}", e)))?;

        let format = ConfigFormat::detect(&path, &content);
        debug!("Detected config format: {:?}", format);

        let config = Self::parse_content(&content, format)?;
        let config = Arc::new(RwLock::new(config));

        let (event_tx, _) = broadcast::channel(16);
        let event_tx_clone = event_tx.clone();
        let config_clone = config.clone();
        let path_clone = path.clone();

        let rt_handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ApiError::ConfigError(format!("No Tokio runtime available: {}", e)))?;
        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() {
                        info!("Config file changed, reloading...");
                        let config_clone = config_clone.clone();
                        let event_tx_clone = event_tx_clone.clone();
                        let path_clone = path_clone.clone();
                        let rt = rt_handle.clone();

                        rt.spawn(async move {
                            let content = match tokio::fs::read_to_string(&path_clone).await {
                                Ok(c) => c,
                                Err(e) => {
                                    let _ = event_tx_clone.send(ConfigEvent::Error(e.to_string()));
                                    return;
                                }
                            };
                            let format = ConfigFormat::detect(&path_clone, &content);
                            match Self::parse_content(&content, format) {
                                Ok(new_config) => {
                                    *config_clone.write() = new_config;
                                    let _ = event_tx_clone.send(ConfigEvent::Reloaded);
                                }
                                Err(e) => {
                                    error!("Failed to reload config: {}", e);
                                    let _ = event_tx_clone.send(ConfigEvent::Error(e.to_string()));
                                }
                            }
                        });
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {}", e);
                }
            }
        })
        .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let mut manager = Self {
            path,
            format,
            config,
            event_tx,
            _watcher: watcher,
        };

        manager.start_watching()?;
        Ok(manager)
    }

    fn parse_content(content: &str, format: ConfigFormat) -> ApiResult<Config> {
        match format {
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ApiError::ConfigError(format!("Failed to parse JSON config: {}", e))),
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ApiError::ConfigError(format!("Failed to parse YAML config: {}", e))),
        }
    }

    fn start_watching(&mut self) -> ApiResult<()> {
        self._watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(())
    }

    pub fn get_config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConfigEvent> {
        self.event_tx.subscribe()
    }

    pub async fn reload(&self) -> ApiResult<()> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ApiError::ConfigError(format!("Failed to read config: {}", e)))?;
        let new_config = Self::parse_content(&content, self.format)?;
        *self.config.write() = new_config;
        let _ = self.event_tx.send(ConfigEvent::Reloaded);
        Ok(())
    }

    pub async fn save(&self, config: &Config) -> ApiResult<()> {
        let content = match self.format {
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to serialize JSON: {}", e)))?,
            ConfigFormat::Yaml => serde_yaml::to_string(config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to serialize YAML: {}", e)))?,
        };
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| ApiError::ConfigError(format!("Failed to write config: {}", e)))?;
        *self.config.write() = config.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::fs;

    #[tokio::test]
    async fn test_load_json_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let content = r#"{"server": {"host": "0.0.0.0", "port": 8080}, "auth": {"jwt_secret": "s1"}}"#;
        fs::write(&config_path, content).await.unwrap();
        let manager = ConfigManager::new(&config_path).await.unwrap();
        let config = manager.get_config();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.jwt_secret, "s1");
    }

    #[tokio::test]
    async fn test_load_yaml_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let content = "server:\n  port: 9000\nfeatures:\n  rate_limiting: false\n";
        fs::write(&config_path, content).await.unwrap();
        let manager = ConfigManager::new(&config_path).await.unwrap();
        let config = manager.get_config();
        assert_eq!(config.server.port, 9000);
        assert!(!config.features.rate_limiting);
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: 9000\n")
            .await
            .unwrap();
        let manager = ConfigManager::new(&config_path).await.unwrap();

        fs::write(&config_path, "server:\n  port: 9100\n")
            .await
            .unwrap();
        manager.reload().await.unwrap();
        assert_eq!(manager.get_config().server.port, 9100);
    }

    #[test]
    fn test_config_format_detection() {
        let cases = vec![
            ("config.json", ConfigFormat::Json),
            ("config.yaml", ConfigFormat::Yaml),
            ("config.yml", ConfigFormat::Yaml),
        ];
        for (path, expected) in cases {
            let path_buf = PathBuf::from(path);
            assert_eq!(
                ConfigFormat::from_path(&path_buf),
                expected,
                "Failed for: {}",
                path
            );
        }
    }
}
