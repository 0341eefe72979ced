//! Serialized access to one lock file
//!
//! All reads and read-modify-write cycles of a [`LockManager`] go through one
//! mutex, so concurrent mutations from threads sharing the manager never lose
//! updates and a read issued after a write observes it. A failed or panicked
//! mutation does not block later ones.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::migration::migrate;
use super::{CURRENT_VERSION, LockEntry, LockFile};
use crate::common::fs::atomic_write;
use crate::domain::InstallScope;
use crate::error::{Result, invalid_entry_name};
use crate::events::{Event, EventBus};
use crate::filesystem::FileSystem;
use crate::path_utils::is_safe_name;
use crate::paths::PathResolver;

/// Owns reading, migrating and writing one lock file
pub struct LockManager<'a> {
    fs: &'a dyn FileSystem,
    events: &'a EventBus,
    path: PathBuf,
    queue: Mutex<()>,
}

impl std::fmt::Debug for LockManager<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<'a> LockManager<'a> {
    pub fn new(fs: &'a dyn FileSystem, events: &'a EventBus, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            events,
            path: path.into(),
            queue: Mutex::new(()),
        }
    }

    /// Manager for the lock file of `scope`
    pub fn for_scope(
        fs: &'a dyn FileSystem,
        events: &'a EventBus,
        paths: &PathResolver,
        scope: InstallScope,
        project_root: Option<&Path>,
    ) -> Result<Self> {
        Ok(Self::new(fs, events, paths.lock_path(scope, project_root)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current ledger; a missing or unreadable file reads as empty
    pub fn read(&self) -> LockFile {
        let _guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_unlocked()
    }

    /// Replace the ledger on disk
    pub fn write(&self, lock: &LockFile) -> Result<()> {
        let _guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_unlocked(lock)
    }

    /// Insert or replace an entry, keeping the original install time
    pub fn add_entry(&self, name: &str, entry: LockEntry) -> Result<()> {
        if !is_safe_name(name) {
            return Err(invalid_entry_name(name));
        }
        self.mutate(|lock| {
            let mut entry = entry;
            if let Some(existing) = lock.cognitives.get(name) {
                entry.installed_at = existing.installed_at;
            }
            entry.updated_at = Utc::now();
            lock.cognitives.insert(name.to_string(), entry);
            true
        })
    }

    /// Remove an entry; returns whether it existed
    pub fn remove_entry(&self, name: &str) -> Result<bool> {
        let _guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lock = self.read_unlocked();
        if lock.cognitives.remove(name).is_none() {
            return Ok(false);
        }
        self.write_unlocked(&lock)?;
        Ok(true)
    }

    /// Remember the targets picked in the last interactive selection
    pub fn save_last_selected_targets(&self, targets: &[String]) -> Result<()> {
        self.mutate(|lock| {
            lock.last_selected_targets = Some(targets.to_vec());
            true
        })
    }

    pub fn get_last_selected_targets(&self) -> Vec<String> {
        self.read().last_selected_targets.unwrap_or_default()
    }

    pub fn get_all_entries(&self) -> BTreeMap<String, LockEntry> {
        self.read().cognitives
    }

    pub fn get_entry(&self, name: &str) -> Option<LockEntry> {
        self.read().cognitives.remove(name)
    }

    /// Entry names grouped by source identifier
    pub fn get_by_source(&self) -> BTreeMap<String, Vec<String>> {
        self.read().by_source()
    }

    /// Read-modify-write under the queue; writes only when `f` returns true
    pub(crate) fn mutate<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut LockFile) -> bool,
    {
        let _guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lock = self.read_unlocked();
        if f(&mut lock) {
            self.write_unlocked(&lock)?;
        }
        Ok(())
    }

    fn read_unlocked(&self) -> LockFile {
        let content = match self.fs.read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no lock file yet");
                return LockFile::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable lock file, treating as empty");
                return LockFile::new();
            }
        };

        let value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt lock file, treating as empty");
                return LockFile::new();
            }
        };

        let mut lock = match migrate(value, Utc::now()) {
            Ok(migrated) => {
                if let Some(from_version) = migrated.from_version {
                    tracing::debug!(from_version, to_version = CURRENT_VERSION, "migrated lock file");
                    self.events.emit(Event::LockMigrate {
                        from_version,
                        to_version: CURRENT_VERSION,
                    });
                }
                migrated.lock
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unrecognized lock file, treating as empty");
                return LockFile::new();
            }
        };

        lock.cognitives.retain(|name, _| {
            let keep = is_safe_name(name);
            if !keep {
                tracing::warn!(name, "dropping lock entry with invalid name");
            }
            keep
        });

        self.events.emit(Event::LockRead {
            path: self.path.clone(),
            entries: lock.cognitives.len(),
        });
        lock
    }

    fn write_unlocked(&self, lock: &LockFile) -> Result<()> {
        let json = if lock.version == CURRENT_VERSION {
            lock.to_json()?
        } else {
            LockFile {
                version: CURRENT_VERSION,
                ..lock.clone()
            }
            .to_json()?
        };
        atomic_write(self.fs, &self.path, json.as_bytes())?;
        self.events.emit(Event::LockWrite {
            path: self.path.clone(),
            entries: lock.cognitives.len(),
        });
        Ok(())
    }
}
