//! Provider configuration
//!
//! Loaded from `~/.config/ablyform/config.toml`:
//!
//! ```toml
//! token = "your-account-token"
//! url = "https://control.ably.net/v1"
//! ```
//!
//! `ABLY_ACCOUNT_TOKEN` and `ABLY_URL` (or `--token` / `--url`) override
//! the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("ablyform"))
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Control API account token
    pub token: Option<String>,
    /// Control API base URL
    pub url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: None,
            url: control::DEFAULT_URL.to_string(),
        }
    }
}

// Keep the token out of debug logs
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .finish()
    }
}

impl ProviderConfig {
    /// Load config from `path`, or from the default location
    ///
    /// A missing file is not an error: the defaults apply.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => expand_path(p),
            None => config_dir()?.join(CONFIG_FILE),
        };
        Self::load_from(&path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config format in {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply command-line / environment overrides
    pub fn with_overrides(mut self, token: Option<String>, url: Option<String>) -> Self {
        if let Some(token) = token {
            self.token = Some(token);
        }
        if let Some(url) = url {
            self.url = url;
        }
        self
    }
}
