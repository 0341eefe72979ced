//! Cognitive domain types
//!
//! Content units produced by discovery or a remote provider, and the install
//! request that wraps them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CognitError, Result, config_invalid};

/// Kind of a cognitive
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CognitiveType {
    #[default]
    Skill,
    Agent,
    Prompt,
    Rule,
}

impl CognitiveType {
    pub const ALL: [CognitiveType; 4] = [
        CognitiveType::Skill,
        CognitiveType::Agent,
        CognitiveType::Prompt,
        CognitiveType::Rule,
    ];

    /// The well-known file name that carries a unit of this type
    pub fn file_name(self) -> &'static str {
        match self {
            CognitiveType::Skill => "SKILL.md",
            CognitiveType::Agent => "AGENT.md",
            CognitiveType::Prompt => "PROMPT.md",
            CognitiveType::Rule => "RULE.md",
        }
    }

    /// Store subdirectory for this type
    pub fn subdir(self) -> &'static str {
        match self {
            CognitiveType::Skill => "skills",
            CognitiveType::Agent => "agents",
            CognitiveType::Prompt => "prompts",
            CognitiveType::Rule => "rules",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CognitiveType::Skill => "skill",
            CognitiveType::Agent => "agent",
            CognitiveType::Prompt => "prompt",
            CognitiveType::Rule => "rule",
        }
    }
}

impl fmt::Display for CognitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CognitiveType {
    type Err = CognitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" | "skills" => Ok(CognitiveType::Skill),
            "agent" | "agents" => Ok(CognitiveType::Agent),
            "prompt" | "prompts" => Ok(CognitiveType::Prompt),
            "rule" | "rules" => Ok(CognitiveType::Rule),
            other => Err(config_invalid(format!("unknown cognitive type '{other}'"))),
        }
    }
}

/// A unit discovered on local disk
#[derive(Debug, Clone)]
pub struct LocalCognitive {
    pub name: String,
    pub description: String,
    /// Absolute path of the directory holding the unit
    pub source_path: PathBuf,
    pub cognitive_type: CognitiveType,
    /// Raw content of the unit's main file
    pub raw_content: String,
    pub metadata: BTreeMap<String, String>,
}

/// A unit delivered by a remote provider
#[derive(Debug, Clone)]
pub struct RemoteCognitive {
    pub name: String,
    pub description: String,
    pub content: String,
    /// Filesystem-safe name used for the store directory
    pub install_name: String,
    pub source_url: String,
    /// Provider id, e.g. "github", "well-known"
    pub provider_id: String,
    /// Source identifier, e.g. "owner/repo"
    pub source_identifier: String,
    pub cognitive_type: CognitiveType,
    pub metadata: BTreeMap<String, String>,
}

/// What to install, one variant per materialization strategy
#[derive(Debug, Clone)]
pub enum InstallRequest {
    /// Deep-copy a local directory
    Local {
        cognitive: LocalCognitive,
        category: Option<String>,
    },
    /// Write the unit's single well-known file
    Remote {
        cognitive: RemoteCognitive,
        category: Option<String>,
    },
    /// Write every `(file name, content)` pair
    Files {
        name: String,
        cognitive_type: CognitiveType,
        files: Vec<(String, String)>,
        category: Option<String>,
    },
}

impl InstallRequest {
    /// Logical name used for the store directory and the lock entry
    pub fn name(&self) -> &str {
        match self {
            InstallRequest::Local { cognitive, .. } => &cognitive.name,
            InstallRequest::Remote { cognitive, .. } => &cognitive.install_name,
            InstallRequest::Files { name, .. } => name,
        }
    }

    pub fn cognitive_type(&self) -> CognitiveType {
        match self {
            InstallRequest::Local { cognitive, .. } => cognitive.cognitive_type,
            InstallRequest::Remote { cognitive, .. } => cognitive.cognitive_type,
            InstallRequest::Files { cognitive_type, .. } => *cognitive_type,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            InstallRequest::Local { category, .. }
            | InstallRequest::Remote { category, .. }
            | InstallRequest::Files { category, .. } => category.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_round_trips_through_str() {
        for ty in CognitiveType::ALL {
            assert_eq!(ty.as_str().parse::<CognitiveType>().unwrap(), ty);
            assert_eq!(ty.subdir().parse::<CognitiveType>().unwrap(), ty);
        }
        assert!("macro".parse::<CognitiveType>().is_err());
    }

    #[test]
    fn test_type_serializes_lowercase() {
        let json = serde_json::to_string(&CognitiveType::Prompt).unwrap();
        assert_eq!(json, "\"prompt\"");
    }

    #[test]
    fn test_request_accessors() {
        let request = InstallRequest::Files {
            name: "multi".to_string(),
            cognitive_type: CognitiveType::Rule,
            files: vec![("RULE.md".to_string(), "# Rule".to_string())],
            category: Some("lint".to_string()),
        };
        assert_eq!(request.name(), "multi");
        assert_eq!(request.cognitive_type(), CognitiveType::Rule);
        assert_eq!(request.category(), Some("lint"));
    }
}
