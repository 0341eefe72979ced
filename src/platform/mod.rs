//! Platform definitions
//!
//! This module handles:
//! - Platform definitions (Platform, PlatformDirs)
//! - Platform registration and lookup (via PlatformRegistry)
//! - Merging user-defined platforms over the built-ins (via loader)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CognitiveType, InstallScope};

pub mod loader;
pub mod registry;

pub use registry::PlatformRegistry;

/// Install directories for one cognitive type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDirs {
    /// Relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Relative to the home directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
}

/// A tool that consumes installed cognitives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// Platform identifier (e.g., "claude-code", "cursor")
    pub id: String,

    /// Display name for the platform
    pub name: String,

    /// Reads straight from the canonical store; no fan-out needed
    #[serde(default)]
    pub universal: bool,

    /// Directories per cognitive type
    #[serde(default)]
    pub dirs: BTreeMap<CognitiveType, PlatformDirs>,
}

impl Platform {
    /// Create a new platform
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            universal: false,
            dirs: BTreeMap::new(),
        }
    }

    /// Mark the platform as reading from the canonical store
    pub fn universal(mut self) -> Self {
        self.universal = true;
        self
    }

    /// Set project and global directories for a type
    pub fn with_dirs(
        mut self,
        cognitive_type: CognitiveType,
        project: impl Into<String>,
        global: impl Into<String>,
    ) -> Self {
        self.dirs.insert(
            cognitive_type,
            PlatformDirs {
                project: Some(project.into()),
                global: Some(global.into()),
            },
        );
        self
    }

    /// Set only the project directory for a type
    pub fn with_project_dir(
        mut self,
        cognitive_type: CognitiveType,
        project: impl Into<String>,
    ) -> Self {
        self.dirs.entry(cognitive_type).or_default().project = Some(project.into());
        self
    }

    /// Configured directory for `(type, scope)`, if any
    pub fn dir_for(&self, cognitive_type: CognitiveType, scope: InstallScope) -> Option<&str> {
        let dirs = self.dirs.get(&cognitive_type)?;
        match scope {
            InstallScope::Project => dirs.project.as_deref(),
            InstallScope::Global => dirs.global.as_deref(),
        }
    }

    /// Types this platform can receive
    pub fn supported_types(&self) -> Vec<CognitiveType> {
        if self.universal {
            return CognitiveType::ALL.to_vec();
        }
        self.dirs.keys().copied().collect()
    }
}

/// Get default platform definitions
pub fn default_platforms() -> Vec<Platform> {
    registry::default_platforms()
}
