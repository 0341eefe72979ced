//! Transaction support for install operations
//!
//! Every mutation an operation makes is recorded as a [`RollbackAction`]. If
//! the operation fails the log is undone in reverse order. Rollback is best
//! effort: each action is attempted independently and the outcome is counted.
//!
//! ## Usage
//!
//! ```ignore
//! let mut transaction = Transaction::new(fs);
//! transaction.backup_existing(&canonical)?;
//!
//! // Perform operations...
//! transaction.track(RollbackAction::CreateDirectory { path: canonical.clone() });
//!
//! // On success:
//! transaction.commit();
//!
//! // On error (automatic via Drop if not committed):
//! // rollback happens automatically
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::common::fs::remove_path;
use crate::error::{Result, write_failed};
use crate::filesystem::FileSystem;

static BACKUP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One recorded mutation and how to undo it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollbackAction {
    CreateDirectory { path: PathBuf },
    WriteFile { path: PathBuf },
    CreateSymlink { path: PathBuf },
    CopyFile { path: PathBuf },
    CopyDirectory { path: PathBuf },
    /// `path` was moved aside to `backup_path` before being replaced
    RemoveExisting {
        path: PathBuf,
        backup_path: Option<PathBuf>,
    },
}

impl RollbackAction {
    pub fn path(&self) -> &Path {
        match self {
            RollbackAction::CreateDirectory { path }
            | RollbackAction::WriteFile { path }
            | RollbackAction::CreateSymlink { path }
            | RollbackAction::CopyFile { path }
            | RollbackAction::CopyDirectory { path }
            | RollbackAction::RemoveExisting { path, .. } => path,
        }
    }
}

/// Counts reported by [`rollback`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackOutcome {
    pub undone: usize,
    pub failed: usize,
}

fn undo(action: &RollbackAction, fs: &dyn FileSystem) -> std::io::Result<()> {
    match action {
        RollbackAction::WriteFile { path }
        | RollbackAction::CopyFile { path }
        | RollbackAction::CreateSymlink { path } => match fs.remove_file(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        },
        RollbackAction::CreateDirectory { path } | RollbackAction::CopyDirectory { path } => {
            match fs.remove_dir_all(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        }
        RollbackAction::RemoveExisting { path, backup_path } => match backup_path {
            Some(backup) => {
                remove_path(fs, path)?;
                fs.rename(backup, path)
            }
            None => Ok(()),
        },
    }
}

/// Undo `actions` last to first
///
/// A failing action does not stop the others.
pub fn rollback(actions: &[RollbackAction], fs: &dyn FileSystem) -> RollbackOutcome {
    let mut outcome = RollbackOutcome::default();
    for action in actions.iter().rev() {
        match undo(action, fs) {
            Ok(()) => outcome.undone += 1,
            Err(e) => {
                tracing::warn!(path = %action.path().display(), error = %e, "rollback step failed");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

/// Records mutations and rolls them back unless committed
pub struct Transaction<'a> {
    fs: &'a dyn FileSystem,
    actions: Vec<RollbackAction>,
    committed: bool,
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("actions", &self.actions)
            .field("committed", &self.committed)
            .finish()
    }
}

impl<'a> Transaction<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self {
            fs,
            actions: Vec::new(),
            committed: false,
        }
    }

    /// Record a mutation that has happened
    pub fn track(&mut self, action: RollbackAction) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[RollbackAction] {
        &self.actions
    }

    /// Move whatever sits at `path` aside so it can be restored on rollback
    ///
    /// Returns the backup location, or `None` when nothing was there.
    pub fn backup_existing(&mut self, path: &Path) -> Result<Option<PathBuf>> {
        if self.fs.symlink_metadata(path).is_err() {
            return Ok(None);
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let backup = path.with_file_name(format!(
            ".{name}.bak.{}.{}",
            std::process::id(),
            BACKUP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        self.fs
            .rename(path, &backup)
            .map_err(|e| write_failed(path, e))?;
        self.track(RollbackAction::RemoveExisting {
            path: path.to_path_buf(),
            backup_path: Some(backup.clone()),
        });
        Ok(Some(backup))
    }

    /// Keep all changes and discard backups
    pub fn commit(mut self) {
        for action in &self.actions {
            if let RollbackAction::RemoveExisting {
                backup_path: Some(backup),
                ..
            } = action
            {
                if let Err(e) = remove_path(self.fs, backup) {
                    tracing::warn!(path = %backup.display(), error = %e, "failed to remove backup");
                }
            }
        }
        self.committed = true;
    }

    /// Undo everything recorded so far
    pub fn rollback(&mut self) -> RollbackOutcome {
        if self.committed {
            return RollbackOutcome::default();
        }
        let outcome = rollback(&self.actions, self.fs);
        self.actions.clear();
        self.committed = true;
        outcome
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            let outcome = self.rollback();
            if outcome.failed > 0 {
                tracing::warn!(
                    undone = outcome.undone,
                    failed = outcome.failed,
                    "rollback incomplete"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests;
