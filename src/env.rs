//! Environment access for path resolution
//!
//! Core logic never reads process-global variables directly; it receives an
//! [`EnvReader`] and an explicit home directory instead.

use std::collections::HashMap;

/// Reads environment variables
pub trait EnvReader: Send + Sync {
    /// Value of `key`, or `None` when unset or empty
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvReader for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvReader for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Operating system family, selects the global store layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    MacOs,
    Linux,
    Windows,
}

impl OsKind {
    /// The OS this binary was compiled for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            OsKind::MacOs
        } else if cfg!(windows) {
            OsKind::Windows
        } else {
            OsKind::Linux
        }
    }
}
