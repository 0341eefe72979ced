//! Check and sync command tests

mod common;

use predicates::prelude::*;

fn installed_workspace() -> (common::TestWorkspace, String) {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");
    workspace
        .cmd()
        .args(["add", &dir, "--to", "claude-code"])
        .assert()
        .success();
    (workspace, dir)
}

#[test]
fn test_check_healthy() {
    let (workspace, _) = installed_workspace();
    workspace
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 1 cognitive(s) healthy"));
}

#[test]
fn test_check_reports_missing_canonical_as_error() {
    let (workspace, _) = installed_workspace();
    std::fs::remove_dir_all(workspace.path.join(".agents/cognit/skills/general/review")).unwrap();

    workspace
        .cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing_canonical"))
        .stdout(predicate::str::contains("0 healthy, 1 error(s), 0 warning(s)"));
}

#[test]
fn test_check_reports_modified_content_as_warning() {
    let (workspace, _) = installed_workspace();
    workspace.write_file(".agents/cognit/skills/general/review/SKILL.md", "# Edited\n");

    workspace
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("hash_mismatch"))
        .stdout(predicate::str::contains("1 warning(s)"));
}

#[test]
fn test_check_json() {
    let (workspace, _) = installed_workspace();
    let output = workspace
        .cmd()
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["healthy"][0], "review");
    assert_eq!(report["issues"].as_array().unwrap().len(), 0);
}

#[test]
fn test_sync_in_sync() {
    let (workspace, _) = installed_workspace();
    workspace
        .cmd()
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Everything in sync"));
}

#[test]
fn test_sync_dry_run_changes_nothing() {
    let (workspace, _) = installed_workspace();
    let canonical = workspace.path.join(".agents/cognit/skills/general/review");
    std::fs::remove_dir_all(&canonical).unwrap();
    let lock_before = workspace.read_file(".agents/cognit/cognit-lock.json");

    workspace
        .cmd()
        .args(["sync", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing_files"))
        .stdout(predicate::str::contains("0 fixed, 1 remaining"));

    assert!(!canonical.exists());
    assert_eq!(
        workspace.read_file(".agents/cognit/cognit-lock.json"),
        lock_before
    );
}

#[test]
fn test_sync_yes_reinstalls_from_local_source() {
    let (workspace, _) = installed_workspace();
    std::fs::remove_dir_all(workspace.path.join(".agents/cognit/skills/general/review")).unwrap();

    workspace
        .cmd()
        .args(["sync", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 fixed, 0 remaining"));

    assert_eq!(
        workspace.read_file(".agents/cognit/skills/general/review/SKILL.md"),
        "# Review\n"
    );
    // The existing link resolves again
    assert_eq!(
        workspace.read_file(".claude/skills/review/SKILL.md"),
        "# Review\n"
    );
    workspace.cmd().arg("check").assert().success();
}

#[test]
fn test_sync_yes_refreshes_hash_after_source_change() {
    let (workspace, dir) = installed_workspace();
    let old_hash = workspace.lock_json()["cognitives"]["review"]["contentHash"].clone();
    workspace.write_file(".agents/cognit/skills/general/review/SKILL.md", "# Drifted\n");
    workspace.write_file(&format!("{dir}/SKILL.md"), "# Updated\n");

    workspace
        .cmd()
        .args(["sync", "--yes", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"fixed\": 1"));

    assert_eq!(
        workspace.read_file(".agents/cognit/skills/general/review/SKILL.md"),
        "# Updated\n"
    );
    assert_ne!(
        workspace.lock_json()["cognitives"]["review"]["contentHash"],
        old_hash
    );
    workspace
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All 1 cognitive(s) healthy"));
}

#[test]
fn test_sync_yes_leaves_entry_without_source_remaining() {
    let (workspace, dir) = installed_workspace();
    std::fs::remove_dir_all(workspace.path.join(".agents/cognit/skills/general/review")).unwrap();
    std::fs::remove_dir_all(workspace.path.join(&dir)).unwrap();

    workspace
        .cmd()
        .args(["sync", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 fixed, 1 remaining"));

    assert!(workspace.lock_json()["cognitives"].get("review").is_some());
}
