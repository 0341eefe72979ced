//! User settings (`config.yaml` under the global store root)

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, config_invalid, config_parse_failed};
use crate::filesystem::FileSystem;
use crate::path_utils::is_safe_name;
use crate::paths::DEFAULT_CATEGORY;
use crate::platform::Platform;
use crate::platform::PlatformRegistry;
use crate::platform::loader::PlatformLoader;
use crate::retry::RetryPolicy;

/// Settings file name, relative to the global store root
pub const SETTINGS_FILE: &str = "config.yaml";

/// Retry settings for network collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::from_millis(self.max_retries, self.base_delay_ms, self.max_delay_ms)
    }
}

/// Settings (config.yaml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Category used when an install request names none
    pub default_category: String,

    /// Freshness window of cached clones and fetches
    pub cache_ttl_secs: u64,

    pub retry: RetrySettings,

    /// Extra platforms, or replacements for built-in ones with the same id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<Platform>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_category: DEFAULT_CATEGORY.to_string(),
            cache_ttl_secs: 3600,
            retry: RetrySettings::default(),
            platforms: Vec::new(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML; an empty document yields the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load `path`; a missing file yields the defaults
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(config_parse_failed(path.display().to_string(), e.to_string())),
        };
        Self::from_yaml(&content).map_err(|e| match e {
            crate::error::CognitError::ConfigParseFailed { reason, .. } => {
                config_parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }

    /// Built-in platforms with the configured ones merged on top
    pub fn platform_registry(&self) -> Result<PlatformRegistry> {
        PlatformLoader::new(self.platforms.clone()).load()
    }

    fn validate(&self) -> Result<()> {
        if !is_safe_name(&self.default_category) {
            return Err(config_invalid(format!(
                "default_category '{}' is not a valid directory name",
                self.default_category
            )));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(config_invalid(
                "retry.base_delay_ms cannot exceed retry.max_delay_ms",
            ));
        }
        Ok(())
    }
}
