//! Installation of cognitives into the canonical store and platform targets
//!
//! This module handles:
//! - Materializing a unit at its canonical store path (copy, single file or
//!   multiple files), transactionally so a failed re-install restores the
//!   previous copy
//! - Fanning the canonical copy out to each platform target by symlink, with
//!   a copy fallback, or by copy
//! - Removing a unit from a platform target
//!
//! Install never fails with an error: every outcome is an [`InstallResult`].
//!
//! Installs of the same unit are serialized on its canonical path, so
//! concurrent installs to different targets never observe a canonical copy
//! that another call is replacing.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::common::fs::{atomic_write, create_symlink, deep_copy, remove_path};
use crate::domain::{
    CognitiveType, InstallMode, InstallOptions, InstallRequest, InstallResult, InstallScope,
    InstallTarget,
};
use crate::error::{Result, install_failed, platform_not_supported, write_failed};
use crate::events::{Event, EventBus};
use crate::filesystem::FileSystem;
use crate::paths::{DEFAULT_CATEGORY, PathResolver};
use crate::platform::PlatformRegistry;
use crate::transaction::{RollbackAction, Transaction};

/// Installs cognitives for a set of platforms
pub struct Installer<'a> {
    fs: &'a dyn FileSystem,
    paths: &'a PathResolver,
    registry: &'a PlatformRegistry,
    events: &'a EventBus,
    canonical_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl<'a> Installer<'a> {
    /// Create a new installer
    pub fn new(
        fs: &'a dyn FileSystem,
        paths: &'a PathResolver,
        registry: &'a PlatformRegistry,
        events: &'a EventBus,
    ) -> Self {
        Self {
            fs,
            paths,
            registry,
            events,
            canonical_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Install one unit for one target
    pub fn install(
        &self,
        request: &InstallRequest,
        target: &InstallTarget,
        options: &InstallOptions,
    ) -> InstallResult {
        self.emit_start(request, target);
        let result = self
            .canonical_path_for(request, target.scope, options)
            .and_then(|canonical| {
                let lock = self.canonical_lock(&canonical);
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                self.materialize(request, &canonical)?;
                self.fan_out(request, &canonical, target, options)
            });
        self.finish(request, target, result)
    }

    /// Install one unit for many targets, materializing the canonical copy
    /// once per scope
    pub fn install_many(
        &self,
        request: &InstallRequest,
        targets: &[InstallTarget],
        options: &InstallOptions,
    ) -> Vec<InstallResult> {
        // Lock order is fixed (project before global) so overlapping batches
        // cannot deadlock
        let locks: Vec<_> = [InstallScope::Project, InstallScope::Global]
            .into_iter()
            .filter(|scope| targets.iter().any(|t| t.scope == *scope))
            .filter_map(|scope| self.canonical_path_for(request, scope, options).ok())
            .map(|canonical| self.canonical_lock(&canonical))
            .collect();
        let _guards: Vec<_> = locks
            .iter()
            .map(|lock| lock.lock().unwrap_or_else(PoisonError::into_inner))
            .collect();

        let mut project: Option<std::result::Result<PathBuf, String>> = None;
        let mut global: Option<std::result::Result<PathBuf, String>> = None;

        targets
            .iter()
            .map(|target| {
                self.emit_start(request, target);
                let slot = match target.scope {
                    InstallScope::Project => &mut project,
                    InstallScope::Global => &mut global,
                };
                let canonical = slot.get_or_insert_with(|| {
                    self.canonical_path_for(request, target.scope, options)
                        .and_then(|canonical| {
                            self.materialize(request, &canonical)?;
                            Ok(canonical)
                        })
                        .map_err(|e| e.to_string())
                });
                let result = match canonical {
                    Ok(canonical) => self.fan_out(request, canonical, target, options),
                    Err(message) => Err(install_failed(request.name(), message.clone())),
                };
                self.finish(request, target, result)
            })
            .collect()
    }

    /// Remove a unit from a platform target directory
    ///
    /// Returns `false` when there was nothing to remove, the platform reads the
    /// canonical store directly, or the removal failed.
    pub fn remove(
        &self,
        name: &str,
        cognitive_type: CognitiveType,
        target: &InstallTarget,
        project_root: Option<&Path>,
    ) -> bool {
        let path = match self.paths.target_install_path(
            target,
            cognitive_type,
            name,
            project_root,
            self.registry,
        ) {
            Ok(Some(path)) => path,
            Ok(None) => return false,
            Err(e) => {
                tracing::debug!(name, target = %target.target_id, error = %e, "cannot resolve target path");
                return false;
            }
        };
        if self.fs.symlink_metadata(&path).is_err() {
            return false;
        }
        match remove_path(self.fs, &path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove");
                false
            }
        }
    }

    /// Delete the canonical store copy of a unit
    pub fn remove_canonical(
        &self,
        name: &str,
        cognitive_type: CognitiveType,
        category: &str,
        scope: InstallScope,
        project_root: Option<&Path>,
    ) -> bool {
        let Ok(path) =
            self.paths
                .canonical_path(cognitive_type, category, name, scope, project_root)
        else {
            return false;
        };
        if self.fs.symlink_metadata(&path).is_err() {
            return false;
        }
        remove_path(self.fs, &path).is_ok()
    }

    /// Canonical path the request materializes to
    pub fn canonical_path_for(
        &self,
        request: &InstallRequest,
        scope: InstallScope,
        options: &InstallOptions,
    ) -> Result<PathBuf> {
        let category = request
            .category()
            .or(options.default_category.as_deref())
            .unwrap_or(DEFAULT_CATEGORY);
        self.paths.canonical_path(
            request.cognitive_type(),
            category,
            request.name(),
            scope,
            options.project_root.as_deref(),
        )
    }

    fn emit_start(&self, request: &InstallRequest, target: &InstallTarget) {
        self.events.emit(Event::InstallStart {
            name: request.name().to_string(),
            cognitive_type: request.cognitive_type(),
            target_id: target.target_id.clone(),
        });
    }

    fn finish(
        &self,
        request: &InstallRequest,
        target: &InstallTarget,
        result: Result<InstallResult>,
    ) -> InstallResult {
        let result = result.unwrap_or_else(|e| {
            tracing::warn!(name = request.name(), target = %target.target_id, error = %e, "install failed");
            InstallResult::failed(target, request.name(), request.cognitive_type(), e)
        });
        self.events.emit(Event::InstallComplete {
            name: result.name.clone(),
            target_id: result.target_id.clone(),
            mode: result.mode,
            success: result.success,
        });
        result
    }

    /// Mutex guarding installs whose canonical copy lives at `canonical`
    fn canonical_lock(&self, canonical: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .canonical_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(canonical.to_path_buf()).or_default())
    }

    /// Write the unit at its canonical path, replacing any previous copy
    ///
    /// Callers hold the canonical lock for `canonical`.
    fn materialize(&self, request: &InstallRequest, canonical: &Path) -> Result<()> {
        let canonical = canonical.to_path_buf();

        let mut transaction = Transaction::new(self.fs);
        transaction.backup_existing(&canonical)?;
        self.fs
            .create_dir_all(&canonical)
            .map_err(|e| write_failed(&canonical, e))?;
        transaction.track(RollbackAction::CreateDirectory {
            path: canonical.clone(),
        });

        match request {
            InstallRequest::Local { cognitive, .. } => {
                deep_copy(self.fs, &cognitive.source_path, &canonical)?;
                transaction.track(RollbackAction::CopyDirectory {
                    path: canonical.clone(),
                });
            }
            InstallRequest::Remote { cognitive, .. } => {
                let file = canonical.join(cognitive.cognitive_type.file_name());
                atomic_write(self.fs, &file, cognitive.content.as_bytes())?;
                transaction.track(RollbackAction::WriteFile { path: file });
            }
            InstallRequest::Files { name, files, .. } => {
                for (file_name, content) in files {
                    let file = contained_path(&canonical, file_name)
                        .ok_or_else(|| install_failed(name, format!("invalid file name '{file_name}'")))?;
                    atomic_write(self.fs, &file, content.as_bytes())?;
                    transaction.track(RollbackAction::WriteFile { path: file });
                }
            }
        }

        transaction.commit();
        Ok(())
    }

    /// Deliver the canonical copy to one target
    fn fan_out(
        &self,
        request: &InstallRequest,
        canonical: &Path,
        target: &InstallTarget,
        options: &InstallOptions,
    ) -> Result<InstallResult> {
        let name = request.name();
        let cognitive_type = request.cognitive_type();
        let delivered = |path: PathBuf, symlink_failed: bool| InstallResult {
            success: true,
            target_id: target.target_id.clone(),
            name: name.to_string(),
            cognitive_type,
            path,
            mode: target.mode,
            canonical_path: Some(canonical.to_path_buf()),
            symlink_failed,
            error: None,
        };

        let platform = self
            .registry
            .get(&target.target_id)
            .ok_or_else(|| platform_not_supported(&target.target_id))?;
        if platform.universal {
            return Ok(delivered(canonical.to_path_buf(), false));
        }

        let Some(target_path) = self.paths.target_install_path(
            target,
            cognitive_type,
            name,
            options.project_root.as_deref(),
            self.registry,
        )?
        else {
            tracing::debug!(name, target = %target.target_id, %cognitive_type, "no target directory, canonical only");
            return Ok(delivered(canonical.to_path_buf(), false));
        };

        match target.mode {
            InstallMode::Symlink => {
                if create_symlink(self.fs, canonical, &target_path) {
                    self.events.emit(Event::InstallSymlink {
                        name: name.to_string(),
                        target_id: target.target_id.clone(),
                        link: target_path.clone(),
                        canonical: canonical.to_path_buf(),
                    });
                    return Ok(delivered(target_path, false));
                }
                tracing::debug!(link = %target_path.display(), "symlink failed, copying");
                self.copy_to(canonical, &target_path)?;
                self.events.emit(Event::InstallCopy {
                    name: name.to_string(),
                    target_id: target.target_id.clone(),
                    path: target_path.clone(),
                    fallback: true,
                });
                Ok(delivered(target_path, true))
            }
            InstallMode::Copy => {
                self.copy_to(canonical, &target_path)?;
                self.events.emit(Event::InstallCopy {
                    name: name.to_string(),
                    target_id: target.target_id.clone(),
                    path: target_path.clone(),
                    fallback: false,
                });
                Ok(delivered(target_path, false))
            }
        }
    }

    fn copy_to(&self, canonical: &Path, target_path: &Path) -> Result<()> {
        let mut transaction = Transaction::new(self.fs);
        transaction.backup_existing(target_path)?;
        transaction.track(RollbackAction::CopyDirectory {
            path: target_path.to_path_buf(),
        });
        deep_copy(self.fs, canonical, target_path)?;
        transaction.commit();
        Ok(())
    }
}

/// `base/relative` if `relative` stays inside `base`
fn contained_path(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let safe = !relative.as_os_str().is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    safe.then(|| base.join(relative))
}
