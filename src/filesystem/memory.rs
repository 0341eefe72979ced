//! In-memory filesystem for tests
//!
//! Supports symlinks (relative and absolute, with cycle detection), records
//! every call, and can be told to fail specific operations.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{DirEntry, FileKind, FileSystem, Metadata, symlink_loop_error};

/// Maximum symlink hops before a path is considered cyclic
const MAX_SYMLINK_HOPS: usize = 40;

/// Operation names used by the call log and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Read,
    Write,
    CreateDir,
    ReadDir,
    Metadata,
    SymlinkMetadata,
    Symlink,
    ReadLink,
    RemoveFile,
    RemoveDirAll,
    Rename,
    CopyDirectory,
}

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsCall {
    pub op: FsOp,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

type FailRule = (FsOp, Box<dyn Fn(&Path) -> bool + Send + Sync>);

#[derive(Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    calls: Vec<FsCall>,
    failures: Vec<FailRule>,
}

enum Piece {
    Root(OsString),
    Parent,
    Normal(OsString),
}

fn pieces(path: &Path) -> Vec<Piece> {
    path.components()
        .filter_map(|c| match c {
            Component::Prefix(p) => Some(Piece::Root(p.as_os_str().to_os_string())),
            Component::RootDir => Some(Piece::Root(OsString::from(
                std::path::MAIN_SEPARATOR.to_string(),
            ))),
            Component::CurDir => None,
            Component::ParentDir => Some(Piece::Parent),
            Component::Normal(n) => Some(Piece::Normal(n.to_os_string())),
        })
        .collect()
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file or directory: {}", path.display()),
    )
}

fn invalid(path: &Path, what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{what}: {}", path.display()),
    )
}

impl State {
    fn is_root(path: &Path) -> bool {
        path.parent().is_none()
    }

    fn node(&self, path: &Path) -> Option<Node> {
        if Self::is_root(path) {
            return Some(Node::Dir);
        }
        self.nodes.get(path).cloned()
    }

    /// Resolve symlinks along `path`. The last component is followed only when
    /// `follow_last` is set. Missing components resolve lexically.
    fn resolve(&self, path: &Path, follow_last: bool) -> io::Result<PathBuf> {
        let mut stack: Vec<Piece> = pieces(path);
        stack.reverse();
        let mut current = PathBuf::new();
        let mut hops = 0;

        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Root(root) => current = PathBuf::from(root),
                Piece::Parent => {
                    current.pop();
                }
                Piece::Normal(name) => {
                    let next = current.join(&name);
                    let is_last = stack.is_empty();
                    match self.nodes.get(&next) {
                        Some(Node::Symlink(target)) if !is_last || follow_last => {
                            hops += 1;
                            if hops > MAX_SYMLINK_HOPS {
                                return Err(symlink_loop_error());
                            }
                            let mut replacement = pieces(target);
                            replacement.reverse();
                            stack.extend(replacement);
                        }
                        _ => current = next,
                    }
                }
            }
        }
        Ok(current)
    }

    fn children(&self, dir: &Path) -> Vec<PathBuf> {
        self.nodes
            .keys()
            .filter(|k| k.parent() == Some(dir))
            .cloned()
            .collect()
    }

    fn subtree(&self, root: &Path) -> Vec<PathBuf> {
        self.nodes
            .keys()
            .filter(|k| k.starts_with(root))
            .cloned()
            .collect()
    }

    fn require_parent_dir(&self, path: &Path) -> io::Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match self.node(parent) {
            Some(Node::Dir) => Ok(()),
            Some(_) => Err(invalid(parent, "not a directory")),
            None => Err(not_found(parent)),
        }
    }

    fn mkdir_all(&mut self, path: &Path) -> io::Result<()> {
        let mut ancestors: Vec<&Path> = path.ancestors().collect();
        ancestors.reverse();
        for ancestor in ancestors {
            match self.node(ancestor) {
                Some(Node::Dir) => {}
                Some(_) => return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("not a directory: {}", ancestor.display()),
                )),
                None => {
                    self.nodes.insert(ancestor.to_path_buf(), Node::Dir);
                }
            }
        }
        Ok(())
    }
}

/// Thread-safe in-memory [`FileSystem`]
#[derive(Clone, Default)]
pub struct MemoryFs {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for MemoryFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFs").finish_non_exhaustive()
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call and return the injected failure, if any
    fn enter(&self, state: &mut State, op: FsOp, path: &Path) -> io::Result<()> {
        state.calls.push(FsCall {
            op,
            path: path.to_path_buf(),
        });
        let injected = state
            .failures
            .iter()
            .any(|(failing_op, matches)| *failing_op == op && matches(path));
        if injected {
            return Err(io::Error::other(format!(
                "injected {op:?} failure: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Make every future `op` on a path matching `matcher` fail
    pub fn fail_on<F>(&self, op: FsOp, matcher: F)
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.lock().failures.push((op, Box::new(matcher)));
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<FsCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Seed a file, creating parent directories
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref();
        let mut state = self.lock();
        if let Some(parent) = path.parent() {
            let _ = state.mkdir_all(parent);
        }
        state
            .nodes
            .insert(path.to_path_buf(), Node::File(contents.as_ref().to_vec()));
    }

    /// Seed a directory and its parents
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let _ = self.lock().mkdir_all(path.as_ref());
    }

    /// Seed a symlink, creating parent directories
    pub fn add_symlink(&self, target: impl AsRef<Path>, link: impl AsRef<Path>) {
        let link = link.as_ref();
        let mut state = self.lock();
        if let Some(parent) = link.parent() {
            let _ = state.mkdir_all(parent);
        }
        state
            .nodes
            .insert(link.to_path_buf(), Node::Symlink(target.as_ref().to_path_buf()));
    }

    /// Whether `path` itself is a symlink
    pub fn is_symlink(&self, path: impl AsRef<Path>) -> bool {
        matches!(
            self.lock().nodes.get(path.as_ref()),
            Some(Node::Symlink(_))
        )
    }
}

impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::Read, path)?;
        let resolved = state.resolve(path, true)?;
        match state.node(&resolved) {
            Some(Node::File(bytes)) => Ok(bytes),
            Some(_) => Err(invalid(path, "is a directory")),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::Write, path)?;
        let resolved = state.resolve(path, true)?;
        if matches!(state.node(&resolved), Some(Node::Dir)) {
            return Err(invalid(path, "is a directory"));
        }
        state.require_parent_dir(&resolved)?;
        state.nodes.insert(resolved, Node::File(contents.to_vec()));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::CreateDir, path)?;
        let resolved = state.resolve(path, true)?;
        state.mkdir_all(&resolved)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::ReadDir, path)?;
        let resolved = state.resolve(path, true)?;
        match state.node(&resolved) {
            Some(Node::Dir) => {}
            Some(_) => return Err(invalid(path, "not a directory")),
            None => return Err(not_found(path)),
        }
        let entries = state
            .children(&resolved)
            .into_iter()
            .filter_map(|child| {
                let kind = match state.nodes.get(&child)? {
                    Node::File(_) => FileKind::File,
                    Node::Dir => FileKind::Dir,
                    Node::Symlink(_) => FileKind::Symlink,
                };
                let name = child.file_name()?.to_string_lossy().into_owned();
                Some(DirEntry { name, kind })
            })
            .collect();
        Ok(entries)
    }

    fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::Metadata, path)?;
        let resolved = state.resolve(path, true)?;
        match state.node(&resolved) {
            Some(Node::File(bytes)) => Ok(Metadata {
                kind: FileKind::File,
                len: bytes.len() as u64,
            }),
            Some(Node::Dir) => Ok(Metadata {
                kind: FileKind::Dir,
                len: 0,
            }),
            // Unreachable after resolution, reported as dangling
            Some(Node::Symlink(_)) | None => Err(not_found(path)),
        }
    }

    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::SymlinkMetadata, path)?;
        let resolved = state.resolve(path, false)?;
        match state.node(&resolved) {
            Some(Node::File(bytes)) => Ok(Metadata {
                kind: FileKind::File,
                len: bytes.len() as u64,
            }),
            Some(Node::Dir) => Ok(Metadata {
                kind: FileKind::Dir,
                len: 0,
            }),
            Some(Node::Symlink(_)) => Ok(Metadata {
                kind: FileKind::Symlink,
                len: 0,
            }),
            None => Err(not_found(path)),
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::Symlink, link)?;
        let resolved = state.resolve(link, false)?;
        if state.node(&resolved).is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists: {}", link.display()),
            ));
        }
        state.require_parent_dir(&resolved)?;
        state
            .nodes
            .insert(resolved, Node::Symlink(target.to_path_buf()));
        Ok(())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::ReadLink, path)?;
        let resolved = state.resolve(path, false)?;
        match state.node(&resolved) {
            Some(Node::Symlink(target)) => Ok(target),
            Some(_) => Err(invalid(path, "not a symlink")),
            None => Err(not_found(path)),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::RemoveFile, path)?;
        let resolved = state.resolve(path, false)?;
        match state.node(&resolved) {
            Some(Node::File(_) | Node::Symlink(_)) => {
                state.nodes.remove(&resolved);
                Ok(())
            }
            Some(Node::Dir) => Err(invalid(path, "is a directory")),
            None => Err(not_found(path)),
        }
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::RemoveDirAll, path)?;
        let resolved = state.resolve(path, false)?;
        match state.node(&resolved) {
            Some(Node::Symlink(_)) => {
                state.nodes.remove(&resolved);
                Ok(())
            }
            Some(Node::Dir) => {
                for key in state.subtree(&resolved) {
                    state.nodes.remove(&key);
                }
                Ok(())
            }
            Some(Node::File(_)) => Err(invalid(path, "not a directory")),
            None => Err(not_found(path)),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::Rename, from)?;
        let source = state.resolve(from, false)?;
        let dest = state.resolve(to, false)?;
        if state.node(&source).is_none() {
            return Err(not_found(from));
        }
        state.require_parent_dir(&dest)?;
        if let Some(existing) = state.node(&dest) {
            if matches!(existing, Node::Dir) && !state.children(&dest).is_empty() {
                return Err(invalid(to, "directory not empty"));
            }
            state.nodes.remove(&dest);
        }
        for key in state.subtree(&source) {
            if let Some(node) = state.nodes.remove(&key) {
                let relative = key.strip_prefix(&source).unwrap_or(Path::new(""));
                let moved = if relative.as_os_str().is_empty() {
                    dest.clone()
                } else {
                    dest.join(relative)
                };
                state.nodes.insert(moved, node);
            }
        }
        Ok(())
    }

    fn copy_directory(&self, src: &Path, dst: &Path) -> io::Result<()> {
        let mut state = self.lock();
        self.enter(&mut state, FsOp::CopyDirectory, src)?;
        let source = state.resolve(src, true)?;
        if !matches!(state.node(&source), Some(Node::Dir)) {
            return Err(not_found(src));
        }
        let dest = state.resolve(dst, true)?;
        state.mkdir_all(&dest)?;
        for key in state.subtree(&source) {
            let Ok(relative) = key.strip_prefix(&source) else {
                continue;
            };
            if relative.as_os_str().is_empty() {
                continue;
            }
            let target = dest.join(relative);
            let copied = match state.nodes.get(&key) {
                Some(Node::Dir) => Some(Node::Dir),
                Some(Node::File(bytes)) => Some(Node::File(bytes.clone())),
                Some(Node::Symlink(_)) => {
                    let followed = state.resolve(&key, true)?;
                    match state.node(&followed) {
                        Some(Node::File(bytes)) => Some(Node::File(bytes)),
                        _ => None,
                    }
                }
                None => None,
            };
            if let Some(node) = copied {
                state.nodes.insert(target, node);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_requires_parent() {
        let fs = MemoryFs::new();
        assert!(fs.write(Path::new("/missing/file.txt"), b"x").is_err());

        fs.add_dir("/present");
        fs.write(Path::new("/present/file.txt"), b"x").unwrap();
        assert_eq!(fs.read(Path::new("/present/file.txt")).unwrap(), b"x");
    }

    #[test]
    fn test_relative_symlink_is_followed() {
        let fs = MemoryFs::new();
        fs.add_file("/store/skills/a/SKILL.md", "# A");
        fs.add_symlink("../../store/skills/a", "/project/.claude/a");

        let content = fs
            .read_to_string(Path::new("/project/.claude/a/SKILL.md"))
            .unwrap();
        assert_eq!(content, "# A");
        assert!(fs.symlink_metadata(Path::new("/project/.claude/a")).unwrap().is_symlink());
        assert!(fs.metadata(Path::new("/project/.claude/a")).unwrap().is_dir());
    }

    #[test]
    fn test_symlink_cycle_reports_loop() {
        let fs = MemoryFs::new();
        fs.add_symlink("/loop/b", "/loop/a");
        fs.add_symlink("/loop/a", "/loop/b");

        let err = fs.metadata(Path::new("/loop/a")).unwrap_err();
        assert!(crate::filesystem::is_symlink_loop(&err));
        // lstat on the link itself still works
        assert!(fs.symlink_metadata(Path::new("/loop/a")).unwrap().is_symlink());
    }

    #[test]
    fn test_rename_moves_subtree() {
        let fs = MemoryFs::new();
        fs.add_file("/a/one/file.txt", "1");
        fs.add_file("/a/one/nested/deep.txt", "2");

        fs.rename(Path::new("/a/one"), Path::new("/a/two")).unwrap();

        assert!(!fs.exists(Path::new("/a/one")));
        assert_eq!(fs.read(Path::new("/a/two/file.txt")).unwrap(), b"1");
        assert_eq!(fs.read(Path::new("/a/two/nested/deep.txt")).unwrap(), b"2");
    }

    #[test]
    fn test_remove_dir_all_on_symlink_keeps_target() {
        let fs = MemoryFs::new();
        fs.add_file("/target/file.txt", "keep");
        fs.add_symlink("/target", "/link");

        fs.remove_dir_all(Path::new("/link")).unwrap();

        assert!(!fs.is_symlink("/link"));
        assert!(fs.exists(Path::new("/target/file.txt")));
    }

    #[test]
    fn test_injected_failure_and_call_log() {
        let fs = MemoryFs::new();
        fs.add_dir("/dir");
        fs.fail_on(FsOp::Write, |p| p.ends_with("bad.txt"));

        assert!(fs.write(Path::new("/dir/bad.txt"), b"x").is_err());
        fs.write(Path::new("/dir/good.txt"), b"x").unwrap();

        let writes: Vec<_> = fs
            .calls()
            .into_iter()
            .filter(|c| c.op == FsOp::Write)
            .collect();
        assert_eq!(writes.len(), 2);
        assert!(!fs.exists(Path::new("/dir/bad.txt")));
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MemoryFs::new();
        fs.add_file("/d/a.txt", "a");
        fs.add_file("/d/sub/b.txt", "b");

        let mut names: Vec<_> = fs
            .read_dir(Path::new("/d"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "sub"]);
    }
}
