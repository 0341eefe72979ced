//! Install target and result types

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CognitiveType;
use crate::error::{CognitError, Result, config_invalid};

/// Where a unit is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallScope {
    #[default]
    Project,
    Global,
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstallScope::Project => "project",
            InstallScope::Global => "global",
        })
    }
}

/// How a unit is delivered to a target directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    #[default]
    Symlink,
    Copy,
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InstallMode::Symlink => "symlink",
            InstallMode::Copy => "copy",
        })
    }
}

impl FromStr for InstallMode {
    type Err = CognitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "symlink" => Ok(InstallMode::Symlink),
            "copy" => Ok(InstallMode::Copy),
            other => Err(config_invalid(format!("unknown install mode '{other}'"))),
        }
    }
}

/// One fan-out destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Platform id, e.g. "claude-code"
    pub target_id: String,
    pub scope: InstallScope,
    pub mode: InstallMode,
}

impl InstallTarget {
    pub fn new(target_id: impl Into<String>, scope: InstallScope, mode: InstallMode) -> Self {
        Self {
            target_id: target_id.into(),
            scope,
            mode,
        }
    }
}

/// Per-call install options
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Required for project scope
    pub project_root: Option<PathBuf>,
    /// Category used when the request carries none
    pub default_category: Option<String>,
}

/// Outcome of installing one unit to one target; failures are data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub success: bool,
    pub target_id: String,
    pub name: String,
    pub cognitive_type: CognitiveType,
    /// Where the target can find the unit
    pub path: PathBuf,
    pub mode: InstallMode,
    pub canonical_path: Option<PathBuf>,
    /// Symlink creation failed and a copy was made instead
    pub symlink_failed: bool,
    pub error: Option<String>,
}

impl InstallResult {
    pub(crate) fn failed(
        target: &InstallTarget,
        name: &str,
        cognitive_type: CognitiveType,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            success: false,
            target_id: target.target_id.clone(),
            name: name.to_string(),
            cognitive_type,
            path: PathBuf::new(),
            mode: target.mode,
            canonical_path: None,
            symlink_failed: false,
            error: Some(error.to_string()),
        }
    }
}
