//! Runtime configuration
//!
//! Read from `--config`, else `~/.config/triage/config.yaml` when present,
//! else built-in defaults. Command line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageConfig {
    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub collect: CollectConfig,

    #[serde(default)]
    pub load: LoadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    /// Per-request timeout for registry calls
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Talk plain HTTP to registries
    #[serde(default)]
    pub insecure: bool,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            insecure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectConfig {
    /// Images processed in parallel per collector
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfig {
    #[serde(default)]
    pub strict: bool,
}

impl TriageConfig {
    /// Load from `explicit` if given, else the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::InvalidConfig {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("triage").join("config.yaml"))
    }

    fn validate(&self) -> Result<()> {
        if self.collect.concurrency == 0 {
            return Err(CoreError::InvalidConfig {
                message: "collect.concurrency must be at least 1".to_string(),
            });
        }
        if self.registry.timeout.is_zero() {
            return Err(CoreError::InvalidConfig {
                message: "registry.timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
