use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::explorer::HttpOptions;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub interact_endpoint: String,
    pub token: Option<String>,
    pub session_id: Option<String>,
    pub download_dir: String,
    pub log_dir: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let download_dir = dirs::download_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fsbridge");
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            interact_endpoint: "/interactwithsession".to_string(),
            token: None,
            session_id: None,
            download_dir: download_dir.to_string_lossy().into_owned(),
            log_dir: "logs".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            backend_url: self.backend_url.clone(),
            interact_endpoint: self.interact_endpoint.clone(),
            token: self.token.clone(),
            session_id: self.session_id.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn download_path(&self) -> PathBuf {
        PathBuf::from(&self.download_dir)
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    config_file: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("fsbridge");

        // Create config directory if it doesn't exist
        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        }

        Ok(Self {
            config_file: config_dir.join("fsbridge.toml"),
        })
    }

    /// Use an explicit config file instead of the per-user one
    pub fn with_file(config_file: PathBuf) -> Self {
        Self { config_file }
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        // If config file doesn't exist, create it with default values
        if !self.config_file.exists() {
            let default_config = AppConfig::default();
            self.save_config(&default_config)?;
        }

        let content: String =
            fs::read_to_string(&self.config_file).context("Failed to read config file")?;

        let mut config: AppConfig =
            toml::from_str(&content).context("Failed to parse config file")?;

        if config.backend_url.trim().is_empty() {
            config.backend_url = AppConfig::default().backend_url;
        }

        Ok(config)
    }

    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_file, toml).context("Failed to write config file")?;
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_file
    }
}
