//! User-level configuration.
//!
//! dxpm reads an optional TOML file with settings that apply to every project:
//!
//! ```toml
//! # ~/.dxpm/config.toml
//! sfdx_binary = "/usr/local/bin/sfdx"
//! install_wait_minutes = 60
//! version_ordering = "numeric"   # or "lexicographic"
//! cache_ttl_secs = 300
//! ```
//!
//! The file is located, in order of precedence, from the `--config` flag,
//! the `DXPM_CONFIG_HOME` directory, or `~/.dxpm/config.toml`. A missing file
//! means defaults. `DXPM_SFDX_BIN` overrides `sfdx_binary` regardless of the
//! file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::DxpmError;
use crate::installer::DEFAULT_WAIT_MINUTES;
use crate::sfdx::DEFAULT_BINARY;
use crate::version::VersionOrdering;

/// Directory holding the config file, overriding `~/.dxpm`.
pub const CONFIG_HOME_ENV: &str = "DXPM_CONFIG_HOME";

/// Overrides the configured `sfdx` binary.
pub const SFDX_BIN_ENV: &str = "DXPM_SFDX_BIN";

const CONFIG_DIR: &str = ".dxpm";
const CONFIG_FILE: &str = "config.toml";

/// Global settings from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    pub sfdx_binary: String,
    pub install_wait_minutes: u32,
    pub version_ordering: VersionOrdering,
    pub cache_ttl_secs: Option<u64>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            sfdx_binary: DEFAULT_BINARY.to_string(),
            install_wait_minutes: DEFAULT_WAIT_MINUTES,
            version_ordering: VersionOrdering::default(),
            cache_ttl_secs: None,
        }
    }
}

impl GlobalConfig {
    /// Default location of the config file, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os(CONFIG_HOME_ENV) {
            return Some(PathBuf::from(home).join(CONFIG_FILE));
        }
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or the default location when `None`, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) => Self::load_file(&path)?,
            None => {
                tracing::warn!(target: "dxpm::config", "no home directory, using default config");
                Self::default()
            }
        };
        config.apply_env(std::env::var(SFDX_BIN_ENV).ok());
        Ok(config)
    }

    /// Parse a config file; a missing file yields defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(target: "dxpm::config", "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let failure = |message: String| DxpmError::ConfigFailure {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
        let config: Self = toml::from_str(&content).map_err(|e| failure(e.to_string()))?;
        if config.sfdx_binary.trim().is_empty() {
            return Err(failure("sfdx_binary must not be empty".to_string()).into());
        }

        tracing::debug!(target: "dxpm::config", "loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self, sfdx_bin: Option<String>) {
        if let Some(binary) = sfdx_bin.filter(|b| !b.trim().is_empty()) {
            tracing::debug!(target: "dxpm::config", "{SFDX_BIN_ENV} overrides sfdx binary: {binary}");
            self.sfdx_binary = binary;
        }
    }

    /// Cache lifetime, if one is configured.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}
