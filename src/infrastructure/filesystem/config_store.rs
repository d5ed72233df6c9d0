use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};
use validator::Validate;

use crate::domain::entities::app_config::AppConfig;

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file not found at path: {0}")]
    ConfigFileNotFound(String),

    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("Configuration file write failed: {0}")]
    WriteFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Store for the per-user YAML configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Whether to validate configuration on read
    validate_on_read: bool,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            validate_on_read: true,
        }
    }
}

impl ConfigStore {
    /// Create a new configuration store with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from a YAML file.
    pub fn read_config<P: AsRef<Path>>(&self, config_path: P) -> Result<AppConfig, ConfigStoreError> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigStoreError::ConfigFileNotFound(
                config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(config_path)
            .map_err(|e| ConfigStoreError::ReadFailed(e.to_string()))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigStoreError::YamlParsingFailed(e.to_string()))?;

        if self.validate_on_read {
            config
                .validate()
                .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))?;
        }

        debug!(path = %config_path.display(), "configuration loaded");
        Ok(config)
    }

    /// Write the configuration to a YAML file.
    pub fn write_config<P: AsRef<Path>>(
        &self,
        config_path: P,
        config: &AppConfig,
    ) -> Result<(), ConfigStoreError> {
        let config_path = config_path.as_ref();

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigStoreError::WriteFailed(e.to_string()))?;
            }
        }

        let yaml = serde_yaml::to_string(config)?;
        fs::write(config_path, yaml).map_err(|e| ConfigStoreError::WriteFailed(e.to_string()))?;
        Ok(())
    }

    /// Read the configuration, creating a default file when none exists.
    pub fn load_or_create<P: AsRef<Path>>(
        &self,
        config_path: P,
    ) -> Result<AppConfig, ConfigStoreError> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            let config = AppConfig::default();
            self.write_config(config_path, &config)?;
            info!(path = %config_path.display(), "created default configuration file");
            return Ok(config);
        }

        self.read_config(config_path)
    }
}
