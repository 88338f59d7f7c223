use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SyncError;
use crate::fetch::{FetchConfig, DEFAULT_ENDPOINT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub endpoint: String,
    pub request_timeout_seconds: u64,
    /// Overrides the default data directory when set; tests point this at
    /// a temp dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            request_timeout_seconds: 10,
            data_dir: None,
        }
    }
}

impl AppConfig {
    pub fn config_file_path() -> Result<PathBuf, SyncError> {
        let config_dir = dirs::config_dir().ok_or(SyncError::ConfigDir)?;
        let app_dir = config_dir.join("feedsync");
        std::fs::create_dir_all(&app_dir)?;
        Ok(app_dir.join("config.json"))
    }

    /// Load the config file, falling back to (and trying to save)
    /// defaults when it is missing or unreadable.
    pub fn load() -> Self {
        match Self::load_from_file() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "could not load config, using defaults");
                let config = Self::default();
                if let Err(e) = config.save() {
                    warn!(error = %e, "could not save default config");
                }
                config
            }
        }
    }

    fn load_from_file() -> Result<Self, SyncError> {
        let path = Self::config_file_path()?;
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<(), SyncError> {
        let path = Self::config_file_path()?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Resolved location of the three storage keys.
    pub fn data_dir(&self) -> Result<PathBuf, SyncError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let config_dir = dirs::config_dir().ok_or(SyncError::ConfigDir)?;
                Ok(config_dir.join("feedsync"))
            }
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            endpoint: self.endpoint.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }
}
