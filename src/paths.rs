//! Path resolution for the canonical store and per-platform install targets
//!
//! Everything here is a pure function of its inputs: the home directory and
//! environment are passed in, never read from the process.

use std::path::{Path, PathBuf};

use crate::domain::{CognitiveType, InstallScope, InstallTarget};
use crate::env::{EnvReader, OsKind};
use crate::error::{Result, platform_not_supported, project_root_required};
use crate::filesystem::FileSystem;
use crate::path_utils::sanitize_name;
use crate::platform::PlatformRegistry;

/// Store directory inside a project
pub const PROJECT_STORE_DIR: &str = ".agents/cognit";

/// Lock file name inside a store root
pub const LOCK_FILE_NAME: &str = "cognit-lock.json";

/// Category used when a unit does not name one
pub const DEFAULT_CATEGORY: &str = "general";

/// Entries that mark a directory as a project root, checked in order
pub const PROJECT_MARKERS: &[&str] = &[
    PROJECT_STORE_DIR,
    ".git",
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "go.mod",
];

/// Platform-specific root of the global store
///
/// - macOS: `~/.agents/cognit`
/// - Linux: `$XDG_DATA_HOME/cognit`, else `~/.local/share/cognit`
/// - Windows: `%APPDATA%\cognit`, else `~\AppData\Roaming\cognit`
pub fn global_base(env: &dyn EnvReader, home: &Path, os: OsKind) -> PathBuf {
    match os {
        OsKind::MacOs => home.join(".agents").join("cognit"),
        OsKind::Linux => env
            .var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or_else(|| home.join(".local").join("share"))
            .join("cognit"),
        OsKind::Windows => env
            .var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("AppData").join("Roaming"))
            .join("cognit"),
    }
}

/// Resolves store, lock and install paths
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: PathBuf,
    global_base: PathBuf,
}

impl PathResolver {
    pub fn new(env: &dyn EnvReader, home: impl Into<PathBuf>, os: OsKind) -> Self {
        let home = home.into();
        let global_base = global_base(env, &home, os);
        Self { home, global_base }
    }

    /// Resolver with an explicit global store root
    pub fn with_global_base(home: impl Into<PathBuf>, global_base: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            global_base: global_base.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn global_base(&self) -> &Path {
        &self.global_base
    }

    /// Root of the store for `scope`
    pub fn store_root(&self, scope: InstallScope, project_root: Option<&Path>) -> Result<PathBuf> {
        match scope {
            InstallScope::Global => Ok(self.global_base.clone()),
            InstallScope::Project => project_root
                .map(|root| root.join(PROJECT_STORE_DIR))
                .ok_or_else(project_root_required),
        }
    }

    /// Lock file location for `scope`
    pub fn lock_path(&self, scope: InstallScope, project_root: Option<&Path>) -> Result<PathBuf> {
        Ok(self.store_root(scope, project_root)?.join(LOCK_FILE_NAME))
    }

    /// `<store root>/<type subdir>/<category>/<name>`
    ///
    /// Category and name are sanitized before any path is built.
    pub fn canonical_path(
        &self,
        cognitive_type: CognitiveType,
        category: &str,
        name: &str,
        scope: InstallScope,
        project_root: Option<&Path>,
    ) -> Result<PathBuf> {
        let category = sanitize_name(category)?;
        let name = sanitize_name(name)?;
        let root = self.store_root(scope, project_root)?;
        Ok(root.join(cognitive_type.subdir()).join(category).join(name))
    }

    /// Platform-specific install path, or `None` when the platform has no
    /// directory for `(type, scope)` (including universal platforms)
    pub fn target_install_path(
        &self,
        target: &InstallTarget,
        cognitive_type: CognitiveType,
        name: &str,
        project_root: Option<&Path>,
        registry: &PlatformRegistry,
    ) -> Result<Option<PathBuf>> {
        let platform = registry
            .get(&target.target_id)
            .ok_or_else(|| platform_not_supported(&target.target_id))?;
        if platform.universal {
            return Ok(None);
        }
        let Some(dir) = platform.dir_for(cognitive_type, target.scope) else {
            return Ok(None);
        };
        let name = sanitize_name(name)?;
        let base = match target.scope {
            InstallScope::Global => self.home.as_path(),
            InstallScope::Project => project_root.ok_or_else(project_root_required)?,
        };
        Ok(Some(base.join(dir).join(name)))
    }
}

/// Walk up from `start` to the first directory holding a project marker
pub fn find_project_root(fs: &dyn FileSystem, start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            PROJECT_MARKERS
                .iter()
                .any(|marker| fs.symlink_metadata(&dir.join(marker)).is_ok())
        })
        .map(Path::to_path_buf)
}
