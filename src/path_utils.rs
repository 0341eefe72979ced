//! Cross-platform path utilities for cognit
//!
//! Name sanitization for store paths and lexical path normalization.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, unsafe_name};

/// Characters that are unsafe in filesystem paths
/// Replaced with hyphens and collapsed: `:`, `*`, `?`, `"`, `<`, `>`, `|`
const PATH_UNSAFE_CHARS: &[char] = &[':', '*', '?', '"', '<', '>', '|'];

/// Validate and sanitize a category or unit name for use as one path component.
///
/// Path separators, `.`/`..` and control characters are rejected outright since
/// they would let a name escape the store. Other unsafe characters and
/// whitespace are replaced with hyphens, consecutive hyphens are collapsed and
/// leading/trailing hyphens removed.
///
/// # Examples
///
/// ```
/// use cognit::path_utils::sanitize_name;
///
/// assert_eq!(sanitize_name("My Skill").unwrap(), "My-Skill");
/// assert!(sanitize_name("../etc").is_err());
/// assert!(sanitize_name("a/b").is_err());
/// ```
pub fn sanitize_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(unsafe_name(name, "name is empty"));
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(unsafe_name(name, "contains a path separator"));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains("..") {
        return Err(unsafe_name(name, "path traversal"));
    }
    if trimmed.chars().any(char::is_control) {
        return Err(unsafe_name(name, "contains control characters"));
    }

    let replaced: String = trimmed
        .chars()
        .map(|c| {
            if PATH_UNSAFE_CHARS.contains(&c) || c.is_whitespace() {
                '-'
            } else {
                c
            }
        })
        .collect();

    let key = replaced
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if key.is_empty() {
        return Err(unsafe_name(name, "no safe characters left"));
    }
    Ok(key)
}

/// Whether `name` survives [`sanitize_name`]
pub fn is_safe_name(name: &str) -> bool {
    sanitize_name(name).is_ok()
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Convert a path to a string with forward slashes
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
