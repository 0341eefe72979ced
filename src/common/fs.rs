//! Common file system operations with unified error handling
//!
//! Atomic writes, exclusion-aware recursive copy and relative symlinks, all
//! through the [`FileSystem`] adapter.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, cyclic_symlink, file_read_failed, write_failed};
use crate::filesystem::{FileKind, FileSystem, is_symlink_loop};
use crate::path_utils::normalize;

/// Suffix of every temp file created by [`atomic_write`]
pub const TEMP_SUFFIX: &str = ".tmp";

/// Nesting limit for [`copy_dir_recursive`]; deeper trees are assumed cyclic
const MAX_COPY_DEPTH: usize = 64;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling temp path, unique per process and call
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(
        ".{name}.{}.{counter}{TEMP_SUFFIX}",
        std::process::id()
    ))
}

/// Whether `path` looks like a temp file left by [`atomic_write`]
pub fn is_temp_path(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .is_some_and(|n| n.starts_with('.') && n.ends_with(TEMP_SUFFIX))
}

/// Write content atomically to a file.
///
/// Writes a sibling temp file and renames it over `path`. On failure the temp
/// file is removed (best effort) and the destination is left untouched.
pub fn atomic_write(fs: &dyn FileSystem, path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs.create_dir_all(parent)
            .map_err(|e| write_failed(path, e))?;
    }

    let temp_path = temp_path_for(path);
    let written = fs
        .write(&temp_path, content)
        .and_then(|()| fs.rename(&temp_path, path));

    if let Err(e) = written {
        if let Err(cleanup) = fs.remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), error = %cleanup, "temp cleanup failed");
        }
        return Err(write_failed(path, e));
    }
    Ok(())
}

/// Name and kind based exclusions for recursive copies
#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Skip any entry whose name starts with one of these
    pub exclude_prefixes: Vec<String>,
    /// Skip directories with these exact names
    pub exclude_dirs: Vec<String>,
    /// Skip files with these exact names
    pub exclude_files: Vec<String>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            exclude_prefixes: vec!["_".to_string()],
            exclude_dirs: vec![".git".to_string()],
            exclude_files: vec!["README.md".to_string(), "metadata.json".to_string()],
        }
    }
}

impl CopyOptions {
    /// Copy everything
    pub fn none() -> Self {
        Self {
            exclude_prefixes: Vec::new(),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
        }
    }

    fn excludes(&self, name: &str, is_dir: bool) -> bool {
        if self.exclude_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return true;
        }
        let names = if is_dir {
            &self.exclude_dirs
        } else {
            &self.exclude_files
        };
        names.iter().any(|n| n == name)
    }
}

/// Copy a unit's directory with the default exclusions
pub fn deep_copy(fs: &dyn FileSystem, src: &Path, dst: &Path) -> Result<()> {
    copy_dir_recursive(fs, src, dst, &CopyOptions::default())
}

/// Copy a directory recursively with options
///
/// Symlinks inside `src` are followed and their content copied.
pub fn copy_dir_recursive(
    fs: &dyn FileSystem,
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
) -> Result<()> {
    copy_level(fs, src, dst, options, 0)
}

fn copy_level(
    fs: &dyn FileSystem,
    src: &Path,
    dst: &Path,
    options: &CopyOptions,
    depth: usize,
) -> Result<()> {
    if depth > MAX_COPY_DEPTH {
        return Err(cyclic_symlink(src));
    }
    fs.create_dir_all(dst).map_err(|e| write_failed(dst, e))?;

    let entries = fs
        .read_dir(src)
        .map_err(|e| file_read_failed(src.display().to_string(), e.to_string()))?;

    for entry in entries {
        let entry_path = src.join(&entry.name);
        let is_dir = match entry.kind {
            FileKind::Dir => true,
            FileKind::File => false,
            FileKind::Symlink => match fs.metadata(&entry_path) {
                Ok(meta) => meta.is_dir(),
                Err(e) if is_symlink_loop(&e) => return Err(cyclic_symlink(&entry_path)),
                Err(e) => {
                    tracing::warn!(path = %entry_path.display(), error = %e, "skipping dangling symlink");
                    continue;
                }
            },
        };

        if options.excludes(&entry.name, is_dir) {
            continue;
        }

        let dst_path = dst.join(&entry.name);
        if is_dir {
            copy_level(fs, &entry_path, &dst_path, options, depth + 1)?;
        } else {
            let bytes = fs.read(&entry_path).map_err(|e| {
                file_read_failed(entry_path.display().to_string(), e.to_string())
            })?;
            fs.write(&dst_path, &bytes)
                .map_err(|e| write_failed(&dst_path, e))?;
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize(&absolute)
}

/// Create a relative symlink at `link` pointing to `target`.
///
/// Idempotent: an existing link to the same target is left alone, anything
/// else at `link` is replaced. Returns `false` instead of failing so callers
/// can fall back to copying.
pub fn create_symlink(fs: &dyn FileSystem, target: &Path, link: &Path) -> bool {
    let target = absolute(target);
    let link = absolute(link);
    if target == link {
        return true;
    }

    match fs.symlink_metadata(&link) {
        Ok(meta) if meta.is_symlink() => match fs.read_link(&link) {
            Ok(existing) => {
                let resolved = match link.parent() {
                    Some(parent) if existing.is_relative() => normalize(&parent.join(&existing)),
                    _ => normalize(&existing),
                };
                if resolved == target {
                    return true;
                }
                if !remove_stale_link(fs, &link) {
                    return false;
                }
            }
            Err(e) => {
                if is_symlink_loop(&e) {
                    tracing::debug!(link = %link.display(), "removing cyclic symlink");
                }
                if !remove_stale_link(fs, &link) {
                    return false;
                }
            }
        },
        Ok(_) => {
            if let Err(e) = remove_path(fs, &link) {
                tracing::debug!(link = %link.display(), error = %e, "cannot replace existing entry");
                return false;
            }
        }
        Err(e) if is_symlink_loop(&e) => {
            tracing::debug!(link = %link.display(), "removing cyclic symlink");
            if !remove_stale_link(fs, &link) {
                return false;
            }
        }
        Err(_) => {}
    }

    let Some(parent) = link.parent() else {
        return false;
    };
    if fs.create_dir_all(parent).is_err() {
        return false;
    }

    let relative = pathdiff::diff_paths(&target, parent).unwrap_or_else(|| target.clone());
    match fs.symlink(&relative, &link) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(link = %link.display(), error = %e, "symlink creation failed");
            false
        }
    }
}

fn remove_stale_link(fs: &dyn FileSystem, link: &Path) -> bool {
    match fs.remove_file(link) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(link = %link.display(), error = %e, "cannot remove existing link");
            false
        }
    }
}

/// Remove a file, symlink or directory tree; a missing path is not an error
pub fn remove_path(fs: &dyn FileSystem, path: &Path) -> io::Result<()> {
    match fs.symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs.remove_dir_all(path),
        Ok(_) => fs.remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
