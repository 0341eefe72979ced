//! Platform configuration loading and merging
//!
//! User-defined platforms come from the settings file and are merged over the
//! built-in definitions.

use std::path::{Component, Path};

use super::{Platform, PlatformRegistry, default_platforms};
use crate::error::{Result, config_invalid};

/// Platform configuration loader
pub struct PlatformLoader {
    custom: Vec<Platform>,
}

impl PlatformLoader {
    /// Create a loader for the platforms declared in settings
    pub fn new(custom: Vec<Platform>) -> Self {
        Self { custom }
    }

    /// Built-in platforms with the custom ones merged on top
    ///
    /// A custom platform with a built-in id replaces it; new ids are appended.
    pub fn load(self) -> Result<PlatformRegistry> {
        for platform in &self.custom {
            validate_platform(platform)?;
        }
        let merged = merge_platforms(default_platforms(), self.custom);
        Ok(PlatformRegistry::new(merged))
    }
}

/// Merge two platform lists
///
/// Later platforms override earlier platforms with matching IDs.
/// New platforms are added to the list.
pub fn merge_platforms(base: Vec<Platform>, override_config: Vec<Platform>) -> Vec<Platform> {
    let mut merged = base;

    for platform in override_config {
        if let Some(pos) = merged.iter().position(|p| p.id == platform.id) {
            merged[pos] = platform;
        } else {
            merged.push(platform);
        }
    }

    merged
}

fn validate_platform(platform: &Platform) -> Result<()> {
    if platform.id.trim().is_empty() {
        return Err(config_invalid("platform id cannot be empty"));
    }
    for (cognitive_type, dirs) in &platform.dirs {
        for dir in [&dirs.project, &dirs.global].into_iter().flatten() {
            let escapes = Path::new(dir)
                .components()
                .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
            if dir.is_empty() || escapes {
                return Err(config_invalid(format!(
                    "platform '{}': {} directory '{}' must be a relative path inside the root",
                    platform.id, cognitive_type, dir
                )));
            }
        }
    }
    Ok(())
}
