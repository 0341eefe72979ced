//! Platform registry for managing platform definitions
//!
//! This module provides:
//! - Platform registration and lookup
//! - Default platform definitions

use std::collections::HashMap;

use super::Platform;
use crate::domain::CognitiveType;

/// Registry of all known platforms
#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    platforms: Vec<Platform>,
    by_id: HashMap<String, usize>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new(default_platforms())
    }
}

impl PlatformRegistry {
    /// Create a new registry with the given platforms
    pub fn new(platforms: Vec<Platform>) -> Self {
        let by_id: HashMap<String, usize> = platforms
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();

        Self { platforms, by_id }
    }

    /// Get a platform by its ID
    pub fn get(&self, id: &str) -> Option<&Platform> {
        if let Some(&idx) = self.by_id.get(id) {
            return self.platforms.get(idx);
        }

        // Aliases
        let alias_id = match id {
            "claude" => "claude-code",
            "gemini" => "gemini-cli",
            "agents" => "universal",
            _ => return None,
        };

        self.by_id
            .get(alias_id)
            .and_then(|&idx| self.platforms.get(idx))
    }

    /// Get all platforms in the registry
    pub fn all(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn ids(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.id.as_str()).collect()
    }
}

/// Built-in platform definitions
///
/// Project directories are relative to the project root, global directories
/// to the home directory.
pub fn default_platforms() -> Vec<Platform> {
    use CognitiveType::{Agent, Prompt, Rule, Skill};

    vec![
        // Tools reading .agents/ directly
        Platform::new("universal", "Universal (.agents)").universal(),
        // Claude Code
        Platform::new("claude-code", "Claude Code")
            .with_dirs(Skill, ".claude/skills", ".claude/skills")
            .with_dirs(Agent, ".claude/agents", ".claude/agents")
            .with_dirs(Prompt, ".claude/commands", ".claude/commands")
            .with_project_dir(Rule, ".claude/rules"),
        // Cursor
        Platform::new("cursor", "Cursor")
            .with_dirs(Skill, ".cursor/skills", ".cursor/skills")
            .with_dirs(Agent, ".cursor/agents", ".cursor/agents")
            .with_project_dir(Prompt, ".cursor/commands")
            .with_project_dir(Rule, ".cursor/rules"),
        // OpenAI Codex
        Platform::new("codex", "Codex")
            .with_dirs(Skill, ".codex/skills", ".codex/skills")
            .with_dirs(Prompt, ".codex/prompts", ".codex/prompts"),
        // OpenCode
        Platform::new("opencode", "OpenCode")
            .with_dirs(Skill, ".opencode/skills", ".config/opencode/skills")
            .with_dirs(Agent, ".opencode/agents", ".config/opencode/agents")
            .with_dirs(Prompt, ".opencode/commands", ".config/opencode/commands"),
        // Windsurf
        Platform::new("windsurf", "Windsurf")
            .with_dirs(Skill, ".windsurf/skills", ".codeium/windsurf/skills")
            .with_project_dir(Prompt, ".windsurf/workflows")
            .with_project_dir(Rule, ".windsurf/rules"),
        // Gemini CLI
        Platform::new("gemini-cli", "Gemini CLI")
            .with_dirs(Skill, ".gemini/skills", ".gemini/skills")
            .with_dirs(Prompt, ".gemini/commands", ".gemini/commands"),
    ]
}
