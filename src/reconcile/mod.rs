//! Reconciler: compare the lock file against the canonical store
//!
//! Both passes walk the ledger and classify every entry by looking at its
//! canonical directory:
//! - absent: the files are gone
//! - present with a different directory hash: the content drifted
//!
//! [`check`] only reports. [`sync`] reports and, when confirmed, hands each
//! issue to a [`RepairHandler`] supplied by the caller.

pub mod check;
pub mod sync;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::domain::InstallScope;
use crate::filesystem::FileSystem;
use crate::hash::verify_directory_hash;
use crate::lockfile::{LockEntry, LockManager};
use crate::paths::{DEFAULT_CATEGORY, PathResolver};

pub use check::{CheckIssue, CheckIssueKind, CheckReport, Severity};
pub use sync::{RepairHandler, SyncIssue, SyncIssueKind, SyncOptions, SyncReport};

/// State of one ledger entry on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Drift {
    Healthy,
    Missing,
    HashMismatch,
}

/// One classified ledger entry
#[derive(Debug, Clone)]
pub(crate) struct Inspection {
    pub name: String,
    pub entry: LockEntry,
    pub path: PathBuf,
    pub drift: Drift,
}

/// Walks one scope's ledger and classifies drift
pub struct Reconciler<'a> {
    fs: &'a dyn FileSystem,
    paths: &'a PathResolver,
    lock: &'a LockManager<'a>,
    scope: InstallScope,
    project_root: Option<PathBuf>,
    default_category: String,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        paths: &'a PathResolver,
        lock: &'a LockManager<'a>,
        scope: InstallScope,
        project_root: Option<&Path>,
    ) -> Self {
        Self {
            fs,
            paths,
            lock,
            scope,
            project_root: project_root.map(Path::to_path_buf),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }

    /// Category used for entries that do not record one
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    pub fn scope(&self) -> InstallScope {
        self.scope
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Canonical directory an entry is expected at
    pub fn canonical_path_of(&self, name: &str, entry: &LockEntry) -> crate::error::Result<PathBuf> {
        let category = entry
            .category
            .as_deref()
            .unwrap_or(self.default_category.as_str());
        self.paths.canonical_path(
            entry.cognitive_type,
            category,
            name,
            self.scope,
            self.project_root.as_deref(),
        )
    }

    /// Classify every entry of the ledger, in name order
    pub(crate) fn inspect(&self) -> Vec<Inspection> {
        self.lock
            .get_all_entries()
            .into_iter()
            .map(|(name, entry)| self.inspect_entry(name, entry))
            .collect()
    }

    fn inspect_entry(&self, name: String, entry: LockEntry) -> Inspection {
        let path = match self.canonical_path_of(&name, &entry) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(name, error = %e, "cannot resolve canonical path");
                return Inspection {
                    name,
                    entry,
                    path: PathBuf::new(),
                    drift: Drift::Missing,
                };
            }
        };

        let drift = if !self.fs.exists(&path) {
            Drift::Missing
        } else if entry.content_hash.is_empty()
            || verify_directory_hash(self.fs, &path, &entry.content_hash)
        {
            Drift::Healthy
        } else {
            Drift::HashMismatch
        };
        tracing::debug!(name, path = %path.display(), ?drift, "inspected lock entry");

        Inspection {
            name,
            entry,
            path,
            drift,
        }
    }
}
