//! Cache statistics

use std::path::Path;

use super::paths::CONTENT_SUFFIX;
use crate::filesystem::{FileKind, FileSystem};

/// Cache statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached clone trees
    pub clones: usize,
    /// Number of cached fetched documents
    pub fetches: usize,
    /// Total size in bytes, sidecars included
    pub total_size: u64,
}

impl CacheStats {
    /// Format total size as human-readable string
    pub fn formatted_size(&self) -> String {
        format_size(self.total_size)
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn format_size(bytes: u64) -> String {
    let size = bytes as f64;
    if size < 1024.0 {
        format!("{bytes} B")
    } else if size < 1024.0 * 1024.0 {
        format!("{:.1} KB", size / 1024.0)
    } else if size < 1024.0 * 1024.0 * 1024.0 {
        format!("{:.1} MB", size / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", size / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Count artifacts in one namespace directory
///
/// Clone trees are the sub-directories; fetched documents are the
/// `.content` files. Unreadable directories count as empty.
pub(crate) fn count_artifacts(fs: &dyn FileSystem, dir: &Path) -> (usize, usize) {
    let Ok(entries) = fs.read_dir(dir) else {
        return (0, 0);
    };
    let mut trees = 0;
    let mut documents = 0;
    for entry in entries {
        match entry.kind {
            FileKind::Dir => trees += 1,
            FileKind::File if entry.name.ends_with(CONTENT_SUFFIX) => documents += 1,
            _ => {}
        }
    }
    (trees, documents)
}

/// Total size of regular files under `path`, not following symlinks
pub(crate) fn dir_size(fs: &dyn FileSystem, path: &Path) -> u64 {
    let Ok(entries) = fs.read_dir(path) else {
        return 0;
    };
    entries
        .into_iter()
        .map(|entry| {
            let child = path.join(&entry.name);
            match entry.kind {
                FileKind::Dir => dir_size(fs, &child),
                FileKind::File => fs.symlink_metadata(&child).map_or(0, |m| m.len),
                FileKind::Symlink => 0,
            }
        })
        .sum()
}
