//! Read-only health check of installed cognitives

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::{Drift, Reconciler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckIssueKind {
    MissingCanonical,
    HashMismatch,
}

impl CheckIssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingCanonical => "missing_canonical",
            Self::HashMismatch => "hash_mismatch",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::MissingCanonical => Severity::Error,
            Self::HashMismatch => Severity::Warning,
        }
    }
}

impl fmt::Display for CheckIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    pub name: String,
    pub kind: CheckIssueKind,
    pub severity: Severity,
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub healthy: Vec<String>,
    pub issues: Vec<CheckIssue>,
    pub summary: String,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warnings(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

fn summarize(healthy: usize, errors: usize, warnings: usize) -> String {
    let total = healthy + errors + warnings;
    if total == 0 {
        return "No cognitives installed".to_string();
    }
    if errors == 0 && warnings == 0 {
        return format!("All {total} cognitive(s) healthy");
    }
    format!("{healthy} healthy, {errors} error(s), {warnings} warning(s)")
}

impl Reconciler<'_> {
    /// Report the state of every ledger entry without touching the disk
    pub fn check(&self) -> CheckReport {
        let mut report = CheckReport::default();

        for inspection in self.inspect() {
            let kind = match inspection.drift {
                Drift::Healthy => {
                    report.healthy.push(inspection.name);
                    continue;
                }
                Drift::Missing => CheckIssueKind::MissingCanonical,
                Drift::HashMismatch => CheckIssueKind::HashMismatch,
            };
            let message = match kind {
                CheckIssueKind::MissingCanonical => format!(
                    "canonical directory missing: {}",
                    inspection.path.display()
                ),
                CheckIssueKind::HashMismatch => format!(
                    "content differs from the recorded hash: {}",
                    inspection.path.display()
                ),
            };
            report.issues.push(CheckIssue {
                name: inspection.name,
                kind,
                severity: kind.severity(),
                path: inspection.path,
                message,
            });
        }

        report.summary = summarize(report.healthy.len(), report.errors(), report.warnings());
        report
    }
}
