//! Drift detection with optional repair

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::{Drift, Reconciler};
use crate::error::Result;
use crate::lockfile::LockEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncIssueKind {
    MissingFiles,
    LockMismatch,
}

impl SyncIssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFiles => "missing_files",
            Self::LockMismatch => "lock_mismatch",
        }
    }
}

impl fmt::Display for SyncIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far a sync may go
///
/// Repairs run only when `confirmed` is set and `dry_run` is not; anything
/// else reports without acting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub confirmed: bool,
}

impl SyncOptions {
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            confirmed: false,
        }
    }

    pub fn confirmed() -> Self {
        Self {
            dry_run: false,
            confirmed: true,
        }
    }

    fn repairs(self) -> bool {
        self.confirmed && !self.dry_run
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncIssue {
    pub name: String,
    pub kind: SyncIssueKind,
    pub path: PathBuf,
    pub fixed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub fixed: usize,
    pub remaining: usize,
    pub issues: Vec<SyncIssue>,
}

/// Re-materializes one drifted entry
///
/// Returns `Ok(true)` when the entry was repaired, `Ok(false)` when the
/// handler does not know how to repair it.
pub trait RepairHandler {
    fn repair(&self, name: &str, entry: &LockEntry, kind: SyncIssueKind) -> Result<bool>;
}

impl<F> RepairHandler for F
where
    F: Fn(&str, &LockEntry, SyncIssueKind) -> Result<bool>,
{
    fn repair(&self, name: &str, entry: &LockEntry, kind: SyncIssueKind) -> Result<bool> {
        self(name, entry, kind)
    }
}

impl Reconciler<'_> {
    /// Detect drift and, when confirmed, repair it
    ///
    /// Without a handler a confirmed sync marks every issue fixed, leaving
    /// the re-fetch to the caller that owns the sources.
    pub fn sync(&self, options: SyncOptions, repair: Option<&dyn RepairHandler>) -> SyncReport {
        let mut report = SyncReport::default();

        for inspection in self.inspect() {
            let kind = match inspection.drift {
                Drift::Healthy => continue,
                Drift::Missing => SyncIssueKind::MissingFiles,
                Drift::HashMismatch => SyncIssueKind::LockMismatch,
            };

            let (fixed, error) = if !options.repairs() {
                (false, None)
            } else {
                match repair {
                    None => (true, None),
                    Some(handler) => match handler.repair(&inspection.name, &inspection.entry, kind) {
                        Ok(fixed) => (fixed, None),
                        Err(e) => {
                            tracing::warn!(name = %inspection.name, error = %e, "repair failed");
                            (false, Some(e.to_string()))
                        }
                    },
                }
            };

            if fixed {
                report.fixed += 1;
            } else {
                report.remaining += 1;
            }
            report.issues.push(SyncIssue {
                name: inspection.name,
                kind,
                path: inspection.path,
                fixed,
                error,
            });
        }

        tracing::debug!(
            fixed = report.fixed,
            remaining = report.remaining,
            dry_run = !options.repairs(),
            "sync finished"
        );
        report
    }
}
