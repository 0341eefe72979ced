use std::cell::RefCell;
use std::path::Path;

use super::*;
use crate::domain::CognitiveType;
use crate::error::install_failed;
use crate::events::EventBus;
use crate::filesystem::{FileSystem, MemoryFs};
use crate::hash::directory_hash;

const ROOT: &str = "/proj";
const LOCK: &str = "/proj/.agents/cognit/cognit-lock.json";
const REVIEW: &str = "/proj/.agents/cognit/skills/general/review";

struct Fixture {
    fs: MemoryFs,
    events: EventBus,
    paths: PathResolver,
}

impl Fixture {
    fn new() -> Self {
        Self {
            fs: MemoryFs::new(),
            events: EventBus::new(),
            paths: PathResolver::with_global_base("/home/me", "/home/me/.local/share/cognit"),
        }
    }

    fn lock(&self) -> LockManager<'_> {
        LockManager::new(&self.fs, &self.events, LOCK)
    }

    fn install(&self, lock: &LockManager<'_>, name: &str, dir: &str, content: &str) {
        self.fs.add_file(format!("{dir}/SKILL.md"), content);
        let hash = directory_hash(&self.fs, Path::new(dir)).unwrap();
        lock.add_entry(
            name,
            LockEntry::new("acme/skills", "github", "", hash, CognitiveType::Skill),
        )
        .unwrap();
    }
}

fn reconciler<'a>(fx: &'a Fixture, lock: &'a LockManager<'a>) -> Reconciler<'a> {
    Reconciler::new(
        &fx.fs,
        &fx.paths,
        lock,
        InstallScope::Project,
        Some(Path::new(ROOT)),
    )
}

#[test]
fn test_check_empty_ledger() {
    let fx = Fixture::new();
    let lock = fx.lock();
    let report = reconciler(&fx, &lock).check();
    assert!(report.is_healthy());
    assert!(report.healthy.is_empty());
    assert_eq!(report.summary, "No cognitives installed");
}

#[test]
fn test_check_healthy_entry() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "review", REVIEW, "# Review");

    let report = reconciler(&fx, &lock).check();
    assert_eq!(report.healthy, vec!["review"]);
    assert!(report.issues.is_empty());
    assert_eq!(report.summary, "All 1 cognitive(s) healthy");
}

#[test]
fn test_check_classifies_missing_and_mismatch() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "review", REVIEW, "# Review");
    fx.install(
        &lock,
        "gone",
        "/proj/.agents/cognit/skills/general/gone",
        "# Gone",
    );
    fx.fs
        .remove_dir_all(Path::new("/proj/.agents/cognit/skills/general/gone"))
        .unwrap();
    fx.fs.add_file(format!("{REVIEW}/SKILL.md"), "# Edited");

    let report = reconciler(&fx, &lock).check();
    assert!(report.healthy.is_empty());
    assert_eq!(report.issues.len(), 2);

    let gone = &report.issues[0];
    assert_eq!(gone.name, "gone");
    assert_eq!(gone.kind, CheckIssueKind::MissingCanonical);
    assert_eq!(gone.severity, Severity::Error);

    let review = &report.issues[1];
    assert_eq!(review.kind, CheckIssueKind::HashMismatch);
    assert_eq!(review.severity, Severity::Warning);
    assert_eq!(review.path, Path::new(REVIEW));

    assert_eq!(report.errors(), 1);
    assert_eq!(report.warnings(), 1);
    assert_eq!(report.summary, "0 healthy, 1 error(s), 1 warning(s)");
}

#[test]
fn test_check_accepts_prefixed_uppercase_hash() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.fs.add_file(format!("{REVIEW}/SKILL.md"), "# Review");
    let hash = directory_hash(&fx.fs, Path::new(REVIEW)).unwrap();
    lock.add_entry(
        "review",
        LockEntry::new(
            "acme/skills",
            "github",
            "",
            format!("sha256:{}", hash.to_uppercase()),
            CognitiveType::Skill,
        ),
    )
    .unwrap();

    assert!(reconciler(&fx, &lock).check().is_healthy());
}

#[test]
fn test_empty_hash_is_healthy_when_present() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.fs.add_file(format!("{REVIEW}/SKILL.md"), "# Review");
    lock.add_entry(
        "review",
        LockEntry::new("acme/skills", "github", "", "", CognitiveType::Skill),
    )
    .unwrap();

    assert_eq!(reconciler(&fx, &lock).check().healthy, vec!["review"]);
}

#[test]
fn test_entry_category_and_type_pick_the_path() {
    let fx = Fixture::new();
    let lock = fx.lock();
    let dir = "/proj/.agents/cognit/rules/lint/strict";
    fx.fs.add_file(format!("{dir}/RULE.md"), "no tabs");
    let hash = directory_hash(&fx.fs, Path::new(dir)).unwrap();
    lock.add_entry(
        "strict",
        LockEntry::new("acme/rules", "github", "", hash, CognitiveType::Rule).with_category("lint"),
    )
    .unwrap();

    assert!(reconciler(&fx, &lock).check().is_healthy());
}

#[test]
fn test_default_category_override() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "review", "/proj/.agents/cognit/skills/team/review", "x");

    assert!(!reconciler(&fx, &lock).check().is_healthy());
    assert!(
        reconciler(&fx, &lock)
            .with_default_category("team")
            .check()
            .is_healthy()
    );
}

#[test]
fn test_sync_dry_run_reports_without_fixing() {
    let fx = Fixture::new();
    let lock = fx.lock();
    lock.add_entry(
        "review",
        LockEntry::new("acme/skills", "github", "", "abc", CognitiveType::Skill),
    )
    .unwrap();

    let report = reconciler(&fx, &lock).sync(SyncOptions::dry_run(), None);
    assert_eq!(report.fixed, 0);
    assert_eq!(report.remaining, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, SyncIssueKind::MissingFiles);
    assert!(!report.issues[0].fixed);
}

#[test]
fn test_sync_confirmed_marks_fixed() {
    let fx = Fixture::new();
    let lock = fx.lock();
    lock.add_entry(
        "review",
        LockEntry::new("acme/skills", "github", "", "abc", CognitiveType::Skill),
    )
    .unwrap();

    let report = reconciler(&fx, &lock).sync(SyncOptions::confirmed(), None);
    assert_eq!(report.fixed, 1);
    assert_eq!(report.remaining, 0);
    assert!(report.issues[0].fixed);
}

#[test]
fn test_sync_without_flags_is_dry_run() {
    let fx = Fixture::new();
    let lock = fx.lock();
    lock.add_entry(
        "review",
        LockEntry::new("acme/skills", "github", "", "abc", CognitiveType::Skill),
    )
    .unwrap();

    let calls = RefCell::new(0);
    let handler = |_: &str, _: &LockEntry, _: SyncIssueKind| -> crate::error::Result<bool> {
        *calls.borrow_mut() += 1;
        Ok(true)
    };
    let report = reconciler(&fx, &lock).sync(SyncOptions::default(), Some(&handler));
    assert_eq!(report.remaining, 1);
    assert_eq!(*calls.borrow(), 0);

    let both = SyncOptions {
        dry_run: true,
        confirmed: true,
    };
    let report = reconciler(&fx, &lock).sync(both, Some(&handler));
    assert_eq!(report.fixed, 0);
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_sync_handler_outcomes() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "drifted", "/proj/.agents/cognit/skills/general/drifted", "a");
    fx.fs.add_file(
        "/proj/.agents/cognit/skills/general/drifted/SKILL.md",
        "b",
    );
    for name in ["broken", "unknown"] {
        lock.add_entry(
            name,
            LockEntry::new("acme/skills", "github", "", "abc", CognitiveType::Skill),
        )
        .unwrap();
    }

    let seen = RefCell::new(Vec::new());
    let handler = |name: &str, _: &LockEntry, kind: SyncIssueKind| {
        seen.borrow_mut().push((name.to_string(), kind));
        match name {
            "drifted" => Ok(true),
            "broken" => Err(install_failed(name, "source gone")),
            _ => Ok(false),
        }
    };

    let report = reconciler(&fx, &lock).sync(SyncOptions::confirmed(), Some(&handler));
    assert_eq!(report.fixed, 1);
    assert_eq!(report.remaining, 2);

    let broken = &report.issues[0];
    assert_eq!(broken.name, "broken");
    assert!(!broken.fixed);
    assert!(broken.error.as_deref().unwrap().contains("source gone"));

    let drifted = &report.issues[1];
    assert_eq!(drifted.kind, SyncIssueKind::LockMismatch);
    assert!(drifted.fixed);

    assert_eq!(
        *seen.borrow(),
        vec![
            ("broken".to_string(), SyncIssueKind::MissingFiles),
            ("drifted".to_string(), SyncIssueKind::LockMismatch),
            ("unknown".to_string(), SyncIssueKind::MissingFiles),
        ]
    );
}

#[test]
fn test_sync_skips_healthy_entries() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "review", REVIEW, "# Review");

    let report = reconciler(&fx, &lock).sync(SyncOptions::confirmed(), None);
    assert_eq!(report, SyncReport::default());
}

#[test]
fn test_check_does_not_write() {
    let fx = Fixture::new();
    let lock = fx.lock();
    fx.install(&lock, "review", REVIEW, "# Review");
    fx.fs.clear_calls();

    reconciler(&fx, &lock).check();
    reconciler(&fx, &lock).sync(SyncOptions::dry_run(), None);

    assert!(fx.fs.calls().iter().all(|call| matches!(
        call.op,
        crate::filesystem::FsOp::Read
            | crate::filesystem::FsOp::ReadDir
            | crate::filesystem::FsOp::Metadata
            | crate::filesystem::FsOp::SymlinkMetadata
            | crate::filesystem::FsOp::ReadLink
    )));
}
