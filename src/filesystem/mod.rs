//! Filesystem abstraction
//!
//! Every component that touches disk goes through [`FileSystem`], so the whole
//! store can run against [`MemoryFs`] in tests (including injected faults) and
//! against [`OsFs`] in production.

mod memory;
mod os;

use std::io;
use std::path::{Path, PathBuf};

pub use memory::{FsCall, FsOp, MemoryFs};
pub use os::OsFs;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
}

/// Minimal metadata returned by `metadata`/`symlink_metadata`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub kind: FileKind,
    pub len: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }
}

/// One entry of a directory listing; `kind` does not follow symlinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: FileKind,
}

/// Filesystem operations used by the store
pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Create or truncate `path` with `contents`; the parent must exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Metadata following symlinks
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Metadata of the entry itself (lstat)
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Create `link` pointing at `target`; `target` is stored verbatim
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;

    /// Remove a file or a symlink
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory tree; on a symlink removes only the link
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Whether `path` exists, following symlinks
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    /// Plain recursive copy of `src` into `dst`, no exclusions
    fn copy_directory(&self, src: &Path, dst: &Path) -> io::Result<()>;
}

#[cfg(target_os = "linux")]
const ELOOP: i32 = 40;
#[cfg(all(unix, not(target_os = "linux")))]
const ELOOP: i32 = 62;
// ERROR_CANT_RESOLVE_FILENAME
#[cfg(windows)]
const ELOOP: i32 = 1921;

/// Error produced when resolving a path runs into a symlink cycle
pub fn symlink_loop_error() -> io::Error {
    io::Error::from_raw_os_error(ELOOP)
}

/// Whether `err` reports a symlink cycle
pub fn is_symlink_loop(err: &io::Error) -> bool {
    err.raw_os_error() == Some(ELOOP)
}
