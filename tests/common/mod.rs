//! Common test utilities for cognit integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use cognit::env::OsKind;
use tempfile::TempDir;

/// A project directory plus an isolated home for one test
pub struct TestWorkspace {
    /// Temporary directory holding both
    pub temp: TempDir,
    /// Project root
    pub path: PathBuf,
    /// Home directory handed to the binary
    pub home: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace with a `.git` marker at the project root
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("project");
        let home = temp.path().join("home");
        std::fs::create_dir_all(path.join(".git")).expect("Failed to create project");
        std::fs::create_dir_all(&home).expect("Failed to create home");
        Self { temp, path, home }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Create `sources/<name>/SKILL.md` (plus a helper file) and return the
    /// directory relative to the workspace
    pub fn create_skill(&self, name: &str, content: &str) -> String {
        let dir = format!("sources/{name}");
        self.write_file(&format!("{dir}/SKILL.md"), content);
        self.write_file(&format!("{dir}/scripts/run.sh"), "echo run\n");
        dir
    }

    /// Environment the binary sees; mirrors what [`TestWorkspace::global_base`]
    /// resolves with
    pub fn env(&self) -> HashMap<String, String> {
        let data = self.home.join(".local").join("share");
        HashMap::from([
            ("HOME".to_string(), self.home.display().to_string()),
            ("USERPROFILE".to_string(), self.home.display().to_string()),
            ("XDG_DATA_HOME".to_string(), data.display().to_string()),
            ("APPDATA".to_string(), data.display().to_string()),
            (
                "COGNIT_CACHE_DIR".to_string(),
                self.cache_dir().display().to_string(),
            ),
        ])
    }

    /// Root of the global store as the binary resolves it
    pub fn global_base(&self) -> PathBuf {
        cognit::paths::global_base(&self.env(), &self.home, OsKind::current())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp.path().join("cache")
    }

    /// Lock file of the project store
    pub fn lock_json(&self) -> serde_json::Value {
        let raw = self.read_file(".agents/cognit/cognit-lock.json");
        serde_json::from_str(&raw).expect("Lock file is not valid JSON")
    }

    /// `cognit` running in the project directory with an isolated home
    pub fn cmd(&self) -> Command {
        let mut cmd = cognit_cmd();
        cmd.current_dir(&self.path).envs(self.env());
        cmd
    }
}

/// The cognit binary with developer overrides cleared
#[allow(deprecated)]
pub fn cognit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cognit").expect("Failed to find cognit binary");
    cmd.env_remove("COGNIT_PROJECT")
        .env_remove("COGNIT_LOG")
        .env_remove("RUST_LOG")
        .env_remove("COGNIT_TMPDIR");
    cmd
}

/// Whether `path` is a symlink
pub fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
