//! Test fixtures for real-disk tests
//!
//! ```ignore
//! use crate::test_fixtures::{commit_file, create_git_repo, create_temp_dir};
//!
//! let temp = create_temp_dir();
//! let (_temp, repo) = create_git_repo();
//! let sha = commit_file(&repo, "SKILL.md", "# Review", "initial");
//! ```

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Temp directory under the system temp location, never under the working
/// directory
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(crate::git::default_scratch_base()).expect("Failed to create temp directory")
}

/// Temp directory holding an empty git repository
#[must_use]
pub fn create_git_repo() -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let path = temp.path().to_path_buf();
    git2::Repository::init(&path).expect("Failed to init git repository");
    (temp, path)
}

/// Write `name` with `content` and commit it on the current branch; returns
/// the commit SHA
pub fn commit_file(repo_path: &Path, name: &str, content: &str, message: &str) -> String {
    let repo = git2::Repository::open(repo_path).expect("Failed to open git repository");
    let file = repo_path.join(name);
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(&file, content).expect("Failed to write file");

    let mut index = repo.index().expect("Failed to open index");
    index.add_path(Path::new(name)).expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = git2::Signature::now("Test", "test@test.com").expect("Failed to create signature");

    let parent = repo
        .head()
        .ok()
        .and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Failed to commit")
        .to_string()
}

/// Write `(relative path, content)` pairs under `base`
pub fn create_test_files(base: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = base.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_git_repo() {
        let (temp, path) = create_git_repo();
        assert!(path.join(".git").exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_commit_file_chains_commits() {
        let (_temp, path) = create_git_repo();
        let first = commit_file(&path, "a/SKILL.md", "one", "first");
        let second = commit_file(&path, "a/SKILL.md", "two", "second");

        let repo = git2::Repository::open(&path).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.id().to_string(), second);
        assert_eq!(head.parent(0).unwrap().id().to_string(), first);
    }

    #[test]
    fn test_create_test_files() {
        let temp = create_temp_dir();
        create_test_files(temp.path(), &[("x/y.md", "hi")]);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("x/y.md")).unwrap(),
            "hi"
        );
    }
}
