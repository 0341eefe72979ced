//! Translation of historical lock file shapes into the current one
//!
//! | version | map key      | notes                                          |
//! |---------|--------------|------------------------------------------------|
//! | 2       | `skills`     | `source`, optional `sourceUrl`, timestamps     |
//! | 3       | `skills`     | adds `sourceType`, `skillPath`                 |
//! | 4       | `cognitives` | adds `cognitiveType`, `category`, selections   |
//! | 5       | `cognitives` | current; adds `contentHash`                    |
//!
//! Folder hashes recorded by versions 3 and 4 came from the remote tree, not
//! from the installed content, so they are dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{CURRENT_VERSION, LockEntry, LockFile};
use crate::domain::CognitiveType;
use crate::error::{Result, config_parse_failed, unsupported_version};

/// Result of bringing a payload to the current version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migrated {
    pub lock: LockFile,
    /// Version the payload was written with, when it was not current
    pub from_version: Option<u32>,
}

/// Entry fields across versions 2 to 4; everything is optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    source_type: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default)]
    skill_path: Option<String>,
    #[serde(default)]
    cognitive_path: Option<String>,
    #[serde(default)]
    cognitive_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    installed_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Current shape with entries left undecoded, so one bad entry is dropped
/// instead of failing the whole ledger
#[derive(Debug, Deserialize)]
struct CurrentLock {
    #[serde(default)]
    cognitives: BTreeMap<String, Value>,
    #[serde(default, rename = "lastSelectedAgents")]
    last_selected_agents: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct LegacyLock {
    #[serde(default, alias = "cognitives")]
    skills: BTreeMap<String, LegacyEntry>,
    #[serde(default, rename = "lastSelectedAgents")]
    last_selected_agents: Option<Vec<String>>,
}

fn parse_timestamp(value: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

impl LegacyEntry {
    fn into_current(self, now: DateTime<Utc>) -> LockEntry {
        let cognitive_type = self
            .cognitive_type
            .as_deref()
            .and_then(|t| t.parse::<CognitiveType>().ok())
            .unwrap_or_default();
        LockEntry {
            source: self.source.unwrap_or_default(),
            source_type: self.source_type.unwrap_or_default(),
            source_url: self.source_url.unwrap_or_default(),
            content_hash: String::new(),
            cognitive_type,
            category: self.category,
            cognitive_path: self.cognitive_path.or(self.skill_path),
            installed_at: parse_timestamp(self.installed_at.as_deref(), now),
            updated_at: parse_timestamp(self.updated_at.as_deref(), now),
        }
    }
}

/// Read the `version` discriminator
fn version_of(value: &Value) -> Result<u32> {
    match value.get("version") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| unsupported_version(n.to_string())),
        Some(other) => Err(unsupported_version(other.to_string())),
        None => Err(unsupported_version("missing")),
    }
}

/// Bring a parsed lock payload to [`CURRENT_VERSION`]
///
/// Fails for payloads that are not objects, have no usable version, carry an
/// unknown version, or do not match the shape their version implies.
pub fn migrate(value: Value, now: DateTime<Utc>) -> Result<Migrated> {
    if !value.is_object() {
        return Err(config_parse_failed(
            "cognit-lock.json",
            "lock file is not a JSON object",
        ));
    }

    let version = version_of(&value)?;
    match version {
        CURRENT_VERSION => {
            let current: CurrentLock = serde_json::from_value(value)
                .map_err(|e| config_parse_failed("cognit-lock.json", e.to_string()))?;
            let cognitives = current
                .cognitives
                .into_iter()
                .filter_map(|(name, entry)| match serde_json::from_value::<LockEntry>(entry) {
                    Ok(entry) => Some((name, entry)),
                    Err(e) => {
                        tracing::warn!(name, error = %e, "dropping malformed lock entry");
                        None
                    }
                })
                .collect();
            Ok(Migrated {
                lock: LockFile {
                    version: CURRENT_VERSION,
                    cognitives,
                    last_selected_targets: current.last_selected_agents,
                },
                from_version: None,
            })
        }
        2..=4 => {
            let legacy: LegacyLock = serde_json::from_value(value)
                .map_err(|e| config_parse_failed("cognit-lock.json", e.to_string()))?;
            let cognitives = legacy
                .skills
                .into_iter()
                .map(|(name, entry)| (name, entry.into_current(now)))
                .collect();
            let last_selected_targets = if version >= 4 {
                legacy.last_selected_agents
            } else {
                None
            };
            Ok(Migrated {
                lock: LockFile {
                    version: CURRENT_VERSION,
                    cognitives,
                    last_selected_targets,
                },
                from_version: Some(version),
            })
        }
        other => Err(unsupported_version(other.to_string())),
    }
}
