//! Viewer configuration — where the backend lives and how to reach it.
//!
//! User-level config: `~/.bankview/config.yaml`
//! Project-level config: `.bankview/config.yaml` (overrides user-level fields)
//!
//! Resolution: CLI flags → project config → user config → `BANKVIEW_URL`
//! env var → defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::service::client::DEFAULT_BASE_URL;
use crate::view::ViewId;

/// Environment fallback for the backend URL.
pub const URL_ENV_VAR: &str = "BANKVIEW_URL";

/// Errors loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Partial config as read from one file; unset fields fall through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_tab: Option<ViewId>,
}

impl ConfigFile {
    /// Read one config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `other` win.
    fn merge(&mut self, other: ConfigFile) {
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.start_tab.is_some() {
            self.start_tab = other.start_tab;
        }
    }
}

/// Fully resolved viewer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub base_url: String,
    /// Request timeout. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Tab activated at startup.
    pub start_tab: ViewId,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: None,
            start_tab: ViewId::BankList,
        }
    }
}

/// Path to `~/.bankview/config.yaml`.
fn user_config_path() -> Option<PathBuf> {
    #[cfg(windows)]
    let home = std::env::var("USERPROFILE").ok();
    #[cfg(not(windows))]
    let home = std::env::var("HOME").ok();
    home.map(|h| PathBuf::from(h).join(".bankview").join("config.yaml"))
}

fn project_config_path() -> PathBuf {
    PathBuf::from(".bankview").join("config.yaml")
}

impl ViewerConfig {
    /// Load user + project config, falling back to env and defaults.
    /// Unreadable or malformed files are logged and skipped.
    pub fn load() -> Self {
        let mut merged = ConfigFile::default();
        if let Some(path) = user_config_path() {
            merged.merge(Self::read_optional(&path));
        }
        merged.merge(Self::read_optional(&project_config_path()));

        if merged.base_url.is_none() {
            merged.base_url = std::env::var(URL_ENV_VAR).ok().filter(|u| !u.is_empty());
        }
        Self::from_file(merged)
    }

    /// Load an explicit config file (`--config`). Errors are returned.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut file = ConfigFile::load(path)?;
        if file.base_url.is_none() {
            file.base_url = std::env::var(URL_ENV_VAR).ok().filter(|u| !u.is_empty());
        }
        Ok(Self::from_file(file))
    }

    fn read_optional(path: &Path) -> ConfigFile {
        if !path.exists() {
            return ConfigFile::default();
        }
        match ConfigFile::load(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("ignoring config: {e}");
                ConfigFile::default()
            }
        }
    }

    /// Resolve a partial file against the defaults.
    pub fn from_file(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            timeout: file
                .timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
            start_tab: file.start_tab.unwrap_or(defaults.start_tab),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        timeout_secs: Option<u64>,
        start_tab: Option<ViewId>,
    ) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(tab) = start_tab {
            self.start_tab = tab;
        }
        self
    }
}
