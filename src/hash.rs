//! SHA-256 hashing utilities for installed content integrity
//!
//! Hashes are bare lowercase hex. A `sha256:` prefix on an expected value is
//! accepted when comparing.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{Result, cyclic_symlink, file_not_found, file_read_failed};
use crate::filesystem::{FileKind, FileSystem, is_symlink_loop};

/// Prefix tolerated on expected hashes
pub const HASH_PREFIX: &str = "sha256:";

/// Nesting limit; deeper trees are treated as symlink cycles
const MAX_DEPTH: usize = 64;

/// SHA-256 of `bytes` as lowercase hex
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn strip_prefix(hash: &str) -> &str {
    hash.strip_prefix(HASH_PREFIX).unwrap_or(hash)
}

/// Compare two hashes ignoring case and an optional `sha256:` prefix
pub fn hashes_match(expected: &str, actual: &str) -> bool {
    strip_prefix(expected.trim()).eq_ignore_ascii_case(strip_prefix(actual.trim()))
}

/// Whether the file at `path` hashes to `expected`; unreadable means `false`
pub fn verify_content_hash(fs: &dyn FileSystem, path: &Path, expected: &str) -> bool {
    match fs.read(path) {
        Ok(bytes) => hashes_match(expected, &content_hash(&bytes)),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot verify content hash");
            false
        }
    }
}

/// Whether the directory at `path` hashes to `expected`; unreadable means `false`
pub fn verify_directory_hash(fs: &dyn FileSystem, path: &Path, expected: &str) -> bool {
    match directory_hash(fs, path) {
        Ok(actual) => hashes_match(expected, &actual),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot verify directory hash");
            false
        }
    }
}

/// Calculate the SHA-256 hash of a directory's contents
///
/// Entries are sorted by name at every level, so enumeration order of the
/// underlying storage never changes the result. Each entry contributes its
/// name, a kind tag and either its content or its sub-directory digest.
/// Symlinks are followed.
pub fn directory_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let meta = fs
        .metadata(path)
        .map_err(|_| file_not_found(path.display().to_string()))?;
    if !meta.is_dir() {
        return Err(file_not_found(path.display().to_string()));
    }
    hash_level(fs, path, 0)
}

fn hash_level(fs: &dyn FileSystem, dir: &Path, depth: usize) -> Result<String> {
    if depth > MAX_DEPTH {
        return Err(cyclic_symlink(dir));
    }
    let read_err = |p: &Path, e: std::io::Error| {
        if is_symlink_loop(&e) {
            cyclic_symlink(p)
        } else {
            file_read_failed(p.display().to_string(), e.to_string())
        }
    };

    let mut entries = fs.read_dir(dir).map_err(|e| read_err(dir, e))?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let mut hasher = Sha256::new();
    for entry in entries {
        let entry_path = dir.join(&entry.name);
        let is_dir = match entry.kind {
            FileKind::Dir => true,
            FileKind::File => false,
            FileKind::Symlink => fs
                .metadata(&entry_path)
                .map_err(|e| read_err(&entry_path, e))?
                .is_dir(),
        };

        hasher.update(entry.name.as_bytes());
        hasher.update(b"\0");
        if is_dir {
            hasher.update(b"d\0");
            let sub = hash_level(fs, &entry_path, depth + 1)?;
            hasher.update(sub.as_bytes());
        } else {
            hasher.update(b"f\0");
            let bytes = fs.read(&entry_path).map_err(|e| read_err(&entry_path, e))?;
            hasher.update(&bytes);
        }
        hasher.update(b"\0");
    }

    Ok(format!("{:x}", hasher.finalize()))
}
