use std::path::Path;

use easel_protocol::desc::DEFAULT_SAMPLER_CACHE_SIZE;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::leak::LeakTracking;

/// Options read once when a context is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Record commands and run them at the next flush/present instead of
    /// executing them inside each call
    #[serde(default)]
    pub defer_api_calls: bool,
    /// Number of deduplicated samplers kept alive, 0 selects the default
    #[serde(default)]
    pub sampler_cache_size: usize,
    /// What the leak tracker records for live user-owned handles
    #[serde(default)]
    pub leak_tracking: LeakTracking,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            defer_api_calls: false,
            sampler_cache_size: 0,
            leak_tracking: LeakTracking::default(),
        }
    }
}

impl Settings {
    pub fn deferred() -> Self {
        Self {
            defer_api_calls: true,
            ..Self::default()
        }
    }

    /// Settings with every "use default" field resolved.
    pub fn normalized(mut self) -> Self {
        if self.sampler_cache_size == 0 {
            self.sampler_cache_size = DEFAULT_SAMPLER_CACHE_SIZE;
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when EASEL_LOG is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

/// Top-level configuration, loaded from easel.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EaselConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EaselConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let config: EaselConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from file if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))
    }
}

/// Returns the default config file path.
/// Search order:
/// 1. System-wide config: `/etc/easel/easel.toml`
/// 2. Local fallback: `./easel.toml`
pub fn default_config_path() -> String {
    let system_path = "/etc/easel/easel.toml";
    if Path::new(system_path).exists() {
        return system_path.to_string();
    }
    "easel.toml".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}
