//! Global configuration for hpkg
//!
//! User-wide settings live in `~/.hpkg/config.toml` (or the file passed with
//! `--config`). A missing file is not an error: every key has a default.
//!
//! ```toml
//! # Local artifact repository (Maven layout)
//! repository = "~/.m2/repository"
//!
//! # Developer workspace map used by record-core-location
//! workspace-map = "~/.jenkins-hpl-map"
//!
//! # Host home directory; hpl writes into {host-home}/plugins
//! host-home = "$HOME/work/jenkins-home"
//! ```
//!
//! Values may use `~` and environment variables; both are expanded when the
//! paths are requested, not when the file is read.

use crate::constants::DEFAULT_WORKSPACE_MAP;
use crate::core::HpkgError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Local artifact repository root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    /// Developer workspace map file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_map: Option<String>,

    /// Default host home for local descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_home: Option<String>,
}

impl GlobalConfig {
    /// `~/.hpkg/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".hpkg").join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`.
    ///
    /// Returns the default configuration if the file does not exist.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Loads a specific file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| HpkgError::ConfigError {
                message: e.to_string(),
            })
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// The repository root, `~/.m2/repository` unless configured.
    ///
    /// # Errors
    ///
    /// Fails if `~` or a variable in the value cannot be expanded.
    pub fn repository_path(&self) -> Result<PathBuf> {
        match &self.repository {
            Some(value) => expand_path(value),
            None => Ok(home_dir()?.join(".m2").join("repository")),
        }
    }

    /// The workspace map file, `~/.jenkins-hpl-map` unless configured.
    ///
    /// # Errors
    ///
    /// Fails if `~` or a variable in the value cannot be expanded.
    pub fn workspace_map_path(&self) -> Result<PathBuf> {
        match &self.workspace_map {
            Some(value) => expand_path(value),
            None => Ok(home_dir()?.join(DEFAULT_WORKSPACE_MAP)),
        }
    }

    /// The configured host home, if any.
    ///
    /// # Errors
    ///
    /// Fails if `~` or a variable in the value cannot be expanded.
    pub fn host_home_path(&self) -> Result<Option<PathBuf>> {
        self.host_home.as_deref().map(expand_path).transpose()
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))
}

/// Expands `~` and `$VAR` references in a configured path.
///
/// # Errors
///
/// [`HpkgError::ConfigError`] naming the variable that could not be resolved.
pub fn expand_path(value: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(value).map_err(|e| HpkgError::ConfigError {
        message: format!("Cannot expand '{value}': {e}"),
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
