//! Lock file (cognit-lock.json) data structures
//!
//! The lock file records every installed cognitive with its provenance and
//! the content hash of its canonical directory.

pub mod manager;
pub mod migration;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::CognitiveType;
use crate::error::{Result, config_parse_failed};

pub use manager::LockManager;

/// Schema version written by this release
pub const CURRENT_VERSION: u32 = 5;

/// One installed cognitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    /// Source identifier, e.g. "owner/repo" or a local path
    #[serde(default)]
    pub source: String,

    /// Provider that produced the unit, e.g. "github", "local"
    #[serde(default)]
    pub source_type: String,

    #[serde(default)]
    pub source_url: String,

    /// Directory hash of the canonical copy, empty when unknown
    #[serde(default)]
    pub content_hash: String,

    pub cognitive_type: CognitiveType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Path of the unit inside its source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_path: Option<String>,

    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LockEntry {
    /// New entry stamped with the current time
    pub fn new(
        source: impl Into<String>,
        source_type: impl Into<String>,
        source_url: impl Into<String>,
        content_hash: impl Into<String>,
        cognitive_type: CognitiveType,
    ) -> Self {
        let now = Utc::now();
        Self {
            source: source.into(),
            source_type: source_type.into(),
            source_url: source_url.into(),
            content_hash: content_hash.into(),
            cognitive_type,
            category: None,
            cognitive_path: None,
            installed_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_cognitive_path(mut self, path: impl Into<String>) -> Self {
        self.cognitive_path = Some(path.into());
        self
    }
}

/// Lock file structure (cognit-lock.json)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFile {
    pub version: u32,

    /// Installed cognitives by logical name
    #[serde(default)]
    pub cognitives: BTreeMap<String, LockEntry>,

    /// Targets picked the last time the user was asked
    #[serde(
        rename = "lastSelectedAgents",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_selected_targets: Option<Vec<String>>,
}

impl Default for LockFile {
    fn default() -> Self {
        Self::new()
    }
}

impl LockFile {
    /// Create an empty lock file at the current version
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            cognitives: BTreeMap::new(),
            last_selected_targets: None,
        }
    }

    /// Serialize to the on-disk form: 2-space indented JSON, trailing newline
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| config_parse_failed("cognit-lock.json", e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Entry names grouped by source identifier
    pub fn by_source(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, entry) in &self.cognitives {
            grouped
                .entry(entry.source.clone())
                .or_default()
                .push(name.clone());
        }
        grouped
    }
}
