//! Configuration Management
//!
//! Handles persistent configuration storage for fetchboard.

use crate::fetch::{FetchOptions, OrchestratorError, DEFAULT_TIMEOUT};
use crate::widgets::weather::Location;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "tasks";

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Per-attempt provider timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Key the task list is stored under
    #[serde(default)]
    pub storage_key: Option<String>,
    /// Directory holding task files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Location for the weather widget
    #[serde(default)]
    pub weather_location: Option<Location>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fetchboard").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file; a missing or malformed file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;

        Ok(())
    }

    /// Get effective fetch options (CLI > config > default)
    pub fn effective_fetch_options(
        &self,
        cli_timeout_ms: Option<u64>,
    ) -> Result<FetchOptions, OrchestratorError> {
        match cli_timeout_ms.or(self.timeout_ms) {
            Some(ms) => FetchOptions::from_millis(ms),
            None => FetchOptions::with_timeout(DEFAULT_TIMEOUT),
        }
    }

    /// Get effective storage key (CLI > config > default)
    pub fn effective_storage_key(&self, cli_key: Option<&str>) -> String {
        cli_key
            .map(str::to_string)
            .or_else(|| self.storage_key.clone())
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string())
    }

    /// Get effective task directory (CLI > config > platform data dir)
    pub fn effective_data_dir(&self, cli_dir: Option<&Path>) -> PathBuf {
        cli_dir
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .or_else(|| dirs::data_dir().map(|p| p.join("fetchboard")))
            .unwrap_or_else(|| PathBuf::from(".fetchboard"))
    }

    pub fn effective_location(&self) -> Location {
        self.weather_location.unwrap_or_default()
    }
}
