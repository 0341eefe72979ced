//! Tests for transaction support

use super::*;
use crate::filesystem::{FsOp, MemoryFs};

#[test]
fn test_rollback_runs_in_reverse_order() {
    let fs = MemoryFs::new();
    fs.add_file("/store/x/SKILL.md", "# x");
    fs.add_symlink("/store/x", "/tool/x");

    let actions = vec![
        RollbackAction::CreateDirectory {
            path: PathBuf::from("/store/x"),
        },
        RollbackAction::WriteFile {
            path: PathBuf::from("/store/x/SKILL.md"),
        },
        RollbackAction::CreateSymlink {
            path: PathBuf::from("/tool/x"),
        },
    ];
    fs.clear_calls();

    let outcome = rollback(&actions, &fs);

    assert_eq!(outcome, RollbackOutcome { undone: 3, failed: 0 });
    let ops: Vec<_> = fs.calls().into_iter().map(|c| (c.op, c.path)).collect();
    assert_eq!(
        ops,
        vec![
            (FsOp::RemoveFile, PathBuf::from("/tool/x")),
            (FsOp::RemoveFile, PathBuf::from("/store/x/SKILL.md")),
            (FsOp::RemoveDirAll, PathBuf::from("/store/x")),
        ]
    );
    assert!(!fs.exists(Path::new("/store/x")));
}

#[test]
fn test_rollback_continues_after_failure() {
    let fs = MemoryFs::new();
    fs.add_file("/a.txt", "a");
    fs.add_file("/b.txt", "b");
    fs.fail_on(FsOp::RemoveFile, |p| p.ends_with("b.txt"));

    let actions = vec![
        RollbackAction::WriteFile {
            path: PathBuf::from("/a.txt"),
        },
        RollbackAction::CopyFile {
            path: PathBuf::from("/b.txt"),
        },
    ];

    let outcome = rollback(&actions, &fs);

    assert_eq!(outcome, RollbackOutcome { undone: 1, failed: 1 });
    assert!(!fs.exists(Path::new("/a.txt")));
    assert!(fs.exists(Path::new("/b.txt")));
}

#[test]
fn test_rollback_restores_backup() {
    let fs = MemoryFs::new();
    fs.add_file("/store/x/SKILL.md", "new");
    fs.add_file("/store/.x.bak/SKILL.md", "old");

    let actions = vec![RollbackAction::RemoveExisting {
        path: PathBuf::from("/store/x"),
        backup_path: Some(PathBuf::from("/store/.x.bak")),
    }];

    let outcome = rollback(&actions, &fs);

    assert_eq!(outcome.undone, 1);
    assert_eq!(
        fs.read_to_string(Path::new("/store/x/SKILL.md")).unwrap(),
        "old"
    );
    assert!(!fs.exists(Path::new("/store/.x.bak")));
}

#[test]
fn test_rollback_of_missing_paths_counts_as_undone() {
    let fs = MemoryFs::new();
    let actions = vec![
        RollbackAction::CopyDirectory {
            path: PathBuf::from("/gone"),
        },
        RollbackAction::RemoveExisting {
            path: PathBuf::from("/never-existed"),
            backup_path: None,
        },
    ];
    assert_eq!(
        rollback(&actions, &fs),
        RollbackOutcome { undone: 2, failed: 0 }
    );
}

#[test]
fn test_transaction_drop_rolls_back() {
    let fs = MemoryFs::new();
    fs.add_file("/store/x/SKILL.md", "original");

    {
        let mut transaction = Transaction::new(&fs);
        transaction.backup_existing(Path::new("/store/x")).unwrap();
        fs.add_file("/store/x/SKILL.md", "replacement");
        transaction.track(RollbackAction::CreateDirectory {
            path: PathBuf::from("/store/x"),
        });
        // Not committed
    }

    assert_eq!(
        fs.read_to_string(Path::new("/store/x/SKILL.md")).unwrap(),
        "original"
    );
    let names: Vec<_> = fs
        .read_dir(Path::new("/store"))
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["x"]);
}

#[test]
fn test_transaction_commit_discards_backup() {
    let fs = MemoryFs::new();
    fs.add_file("/store/x/SKILL.md", "original");

    let mut transaction = Transaction::new(&fs);
    let backup = transaction
        .backup_existing(Path::new("/store/x"))
        .unwrap()
        .unwrap();
    fs.add_file("/store/x/SKILL.md", "replacement");
    transaction.commit();

    assert!(!fs.exists(&backup));
    assert_eq!(
        fs.read_to_string(Path::new("/store/x/SKILL.md")).unwrap(),
        "replacement"
    );
}

#[test]
fn test_backup_existing_without_entry() {
    let fs = MemoryFs::new();
    let mut transaction = Transaction::new(&fs);
    assert_eq!(transaction.backup_existing(Path::new("/nothing")).unwrap(), None);
    assert!(transaction.actions().is_empty());
    transaction.commit();
}
