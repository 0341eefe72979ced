//! Collaborators shared by the commands
//!
//! The binary is the only place that reads process globals: the home
//! directory, current directory and environment are resolved here once and
//! handed to the core explicitly.

use std::path::{Path, PathBuf};

use crate::cache::{Clock, SourceCache, cache_root};
use crate::config::{SETTINGS_FILE, Settings};
use crate::domain::{InstallOptions, InstallScope};
use crate::env::{EnvReader, OsKind, ProcessEnv};
use crate::error::{CognitError, Result};
use crate::events::EventBus;
use crate::filesystem::OsFs;
use crate::git::GitCloner;
use crate::installer::Installer;
use crate::lockfile::LockManager;
use crate::paths::{PathResolver, find_project_root};
use crate::platform::PlatformRegistry;
use crate::reconcile::Reconciler;
use crate::retry::RetryingCloner;

/// Everything a command needs to run against one store
pub struct Context {
    pub fs: OsFs,
    pub events: EventBus,
    pub paths: PathResolver,
    pub settings: Settings,
    pub registry: PlatformRegistry,
    pub scope: InstallScope,
    pub project_root: Option<PathBuf>,
    pub cache_root: PathBuf,
    /// Where clones are checked out before entering the cache
    pub clone_scratch: PathBuf,
}

impl Context {
    /// Context for the real process: home from the OS, current directory,
    /// process environment
    pub fn from_process(project: Option<PathBuf>, global: bool) -> Result<Self> {
        let home = dirs::home_dir().ok_or(CognitError::HomeDirUnavailable)?;
        let cwd = std::env::current_dir()?;
        Self::new(&ProcessEnv, home, &cwd, project, global)
    }

    /// Context from explicit inputs
    ///
    /// In project scope the project root is `project` when given, else the
    /// nearest ancestor of `cwd` carrying a project marker, else `cwd`.
    pub fn new(
        env: &dyn EnvReader,
        home: PathBuf,
        cwd: &Path,
        project: Option<PathBuf>,
        global: bool,
    ) -> Result<Self> {
        let fs = OsFs;
        let paths = PathResolver::new(env, &home, OsKind::current());
        let settings = Settings::load(&fs, &paths.global_base().join(SETTINGS_FILE))?;
        let registry = settings.platform_registry()?;

        let scope = if global {
            InstallScope::Global
        } else {
            InstallScope::Project
        };
        let project_root = match (project, scope) {
            (Some(dir), _) => {
                let dir = if dir.is_absolute() { dir } else { cwd.join(dir) };
                Some(dunce::canonicalize(&dir).unwrap_or(dir))
            }
            (None, InstallScope::Project) => {
                Some(find_project_root(&fs, cwd).unwrap_or_else(|| cwd.to_path_buf()))
            }
            (None, InstallScope::Global) => None,
        };

        tracing::debug!(
            %scope,
            project_root = ?project_root,
            global_base = %paths.global_base().display(),
            "resolved store"
        );

        Ok(Self {
            fs,
            events: EventBus::new(),
            cache_root: cache_root(env, &home),
            clone_scratch: GitCloner::from_env(env).scratch_base().to_path_buf(),
            paths,
            settings,
            registry,
            scope,
            project_root,
        })
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Lock manager for the selected scope
    pub fn lock(&self) -> Result<LockManager<'_>> {
        LockManager::for_scope(
            &self.fs,
            &self.events,
            &self.paths,
            self.scope,
            self.project_root(),
        )
    }

    pub fn installer(&self) -> Installer<'_> {
        Installer::new(&self.fs, &self.paths, &self.registry, &self.events)
    }

    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            project_root: self.project_root.clone(),
            default_category: Some(self.settings.default_category.clone()),
        }
    }

    pub fn source_cache<'a>(&'a self, clock: &'a dyn Clock) -> SourceCache<'a> {
        SourceCache::new(&self.fs, &self.cache_root, self.settings.cache_ttl(), clock)
    }

    /// Git cloner retrying transient failures with the configured policy
    pub fn cloner(&self) -> RetryingCloner<GitCloner> {
        RetryingCloner::new(
            GitCloner::new(&self.clone_scratch),
            self.settings.retry_policy(),
        )
    }

    pub fn reconciler<'a>(&'a self, lock: &'a LockManager<'a>) -> Reconciler<'a> {
        Reconciler::new(&self.fs, &self.paths, lock, self.scope, self.project_root())
            .with_default_category(self.settings.default_category.clone())
    }
}
