//! Add and remove command tests

mod common;

use predicates::prelude::*;

#[test]
fn test_add_materializes_canonical_copy_and_links_target() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");

    workspace
        .cmd()
        .args(["add", &dir, "--to", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"))
        .stdout(predicate::str::contains("review"));

    assert_eq!(
        workspace.read_file(".agents/cognit/skills/general/review/SKILL.md"),
        "# Review\n"
    );
    assert!(workspace.file_exists(".agents/cognit/skills/general/review/scripts/run.sh"));
    assert_eq!(
        workspace.read_file(".claude/skills/review/SKILL.md"),
        "# Review\n"
    );
    #[cfg(unix)]
    assert!(common::is_symlink(&workspace.path.join(".claude/skills/review")));

    let lock = workspace.lock_json();
    assert_eq!(lock["version"], 5);
    let entry = &lock["cognitives"]["review"];
    assert_eq!(entry["sourceType"], "local");
    assert_eq!(entry["cognitiveType"], "skill");
    assert_eq!(entry["category"], "general");
    assert_eq!(entry["contentHash"].as_str().unwrap().len(), 64);
    assert_eq!(lock["lastSelectedAgents"][0], "claude-code");
}

#[test]
fn test_add_copy_mode() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");

    workspace
        .cmd()
        .args(["add", &dir, "--to", "cursor", "--copy"])
        .assert()
        .success();

    let target = workspace.path.join(".cursor/skills/review");
    assert!(target.is_dir());
    assert!(!common::is_symlink(&target));
    assert_eq!(
        workspace.read_file(".cursor/skills/review/SKILL.md"),
        "# Review\n"
    );
}

#[test]
fn test_add_defaults_to_universal_then_last_selection() {
    let workspace = common::TestWorkspace::new();
    let first = workspace.create_skill("first", "# First\n");
    let second = workspace.create_skill("second", "# Second\n");

    workspace.cmd().args(["add", &first]).assert().success();
    assert!(workspace.file_exists(".agents/cognit/skills/general/first/SKILL.md"));
    assert!(!workspace.file_exists(".claude/skills/first"));

    workspace
        .cmd()
        .args(["add", &second, "--to", "claude-code"])
        .assert()
        .success();

    let third = workspace.create_skill("third", "# Third\n");
    workspace.cmd().args(["add", &third]).assert().success();
    assert!(workspace.file_exists(".claude/skills/third/SKILL.md"));
}

#[test]
fn test_add_detects_type_and_honours_category_and_name() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file("sources/style/RULE.md", "Use tabs\n");

    workspace
        .cmd()
        .args([
            "add",
            "sources/style",
            "--name",
            "House Style",
            "--category",
            "team",
            "--to",
            "claude-code",
        ])
        .assert()
        .success();

    assert_eq!(
        workspace.read_file(".agents/cognit/rules/team/House-Style/RULE.md"),
        "Use tabs\n"
    );
    assert!(workspace.file_exists(".claude/rules/House-Style/RULE.md"));

    let lock = workspace.lock_json();
    assert_eq!(lock["cognitives"]["House-Style"]["cognitiveType"], "rule");
    assert_eq!(lock["cognitives"]["House-Style"]["category"], "team");
}

#[test]
fn test_readd_preserves_installed_at_and_replaces_content() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# v1\n");

    workspace.cmd().args(["add", &dir]).assert().success();
    let before = workspace.lock_json();

    workspace.write_file(&format!("{dir}/SKILL.md"), "# v2\n");
    workspace.cmd().args(["add", &dir]).assert().success();
    let after = workspace.lock_json();

    assert_eq!(
        before["cognitives"]["review"]["installedAt"],
        after["cognitives"]["review"]["installedAt"]
    );
    assert_ne!(
        before["cognitives"]["review"]["contentHash"],
        after["cognitives"]["review"]["contentHash"]
    );
    assert_eq!(
        workspace.read_file(".agents/cognit/skills/general/review/SKILL.md"),
        "# v2\n"
    );
}

#[test]
fn test_add_global_scope() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");

    workspace
        .cmd()
        .args(["add", &dir, "--global", "--to", "claude-code"])
        .assert()
        .success();

    let base = workspace.global_base();
    assert!(base.join("skills/general/review/SKILL.md").exists());
    assert!(base.join("cognit-lock.json").exists());
    assert!(workspace.home.join(".claude/skills/review/SKILL.md").exists());
    assert!(!workspace.file_exists(".agents/cognit/cognit-lock.json"));

    workspace
        .cmd()
        .args(["list", "-g"])
        .assert()
        .success()
        .stdout(predicate::str::contains("review"));
}

#[test]
fn test_remove_everywhere() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");
    workspace
        .cmd()
        .args(["add", &dir, "--to", "claude-code", "--to", "cursor"])
        .assert()
        .success();

    workspace
        .cmd()
        .args(["remove", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));

    assert!(!workspace.file_exists(".claude/skills/review"));
    assert!(!workspace.file_exists(".cursor/skills/review"));
    assert!(!workspace.file_exists(".agents/cognit/skills/general/review"));
    assert!(workspace.lock_json()["cognitives"].get("review").is_none());
    // The source is never touched
    assert!(workspace.file_exists("sources/review/SKILL.md"));
}

#[test]
fn test_remove_from_one_platform_keeps_entry() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");
    workspace
        .cmd()
        .args(["add", &dir, "--to", "claude-code", "--to", "cursor"])
        .assert()
        .success();

    workspace
        .cmd()
        .args(["remove", "review", "--from", "cursor"])
        .assert()
        .success();

    assert!(!workspace.file_exists(".cursor/skills/review"));
    assert!(workspace.file_exists(".claude/skills/review/SKILL.md"));
    assert!(workspace.file_exists(".agents/cognit/skills/general/review/SKILL.md"));
    assert!(workspace.lock_json()["cognitives"].get("review").is_some());
}

#[test]
fn test_list_detailed_shows_hash() {
    let workspace = common::TestWorkspace::new();
    let dir = workspace.create_skill("review", "# Review\n");
    workspace.cmd().args(["add", &dir]).assert().success();
    let hash = workspace.lock_json()["cognitives"]["review"]["contentHash"]
        .as_str()
        .unwrap()
        .to_string();

    workspace
        .cmd()
        .args(["list", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains(hash));
}
