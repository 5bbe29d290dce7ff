//! Settings shared by every operation of one installer run.

use std::time::Duration;

use crate::config::GlobalConfig;
use crate::version::VersionOrdering;

/// Default time, in minutes, the tool waits for an install to finish.
pub const DEFAULT_WAIT_MINUTES: u32 = 100;

/// Options for an [`Installer`](super::Installer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// Passed to every install action as `-w`
    pub wait_minutes: u32,
    pub ordering: VersionOrdering,
    /// Lifetime of cached listings; `None` keeps them for the whole run
    pub cache_ttl: Option<Duration>,
    /// Suppress progress lines on stdout
    pub quiet: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            wait_minutes: DEFAULT_WAIT_MINUTES,
            ordering: VersionOrdering::default(),
            cache_ttl: None,
            quiet: false,
        }
    }
}

impl InstallOptions {
    /// Options taken from the user's global configuration.
    pub fn from_config(config: &GlobalConfig, quiet: bool) -> Self {
        Self {
            wait_minutes: config.install_wait_minutes,
            ordering: config.version_ordering,
            cache_ttl: config.cache_ttl(),
            quiet,
        }
    }
}
