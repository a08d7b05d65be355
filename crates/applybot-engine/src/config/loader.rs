use super::schema::ApplyConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./applybot.yaml
    /// 2. ~/.applybot/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<ApplyConfig, ConfigError> {
        let local_config = PathBuf::from("./applybot.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".applybot").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(ApplyConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<ApplyConfig, ConfigError> {
        info!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: ApplyConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Explicit path when given, default locations otherwise.
    pub async fn load(path: Option<&Path>) -> Result<ApplyConfig, ConfigError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Self::load_default().await,
        }
    }
}
