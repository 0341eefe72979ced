//! TTL cache of cloned source trees

use std::path::{Path, PathBuf};

use super::Clock;
use super::meta::{CacheMeta, read_meta, write_meta};
use super::paths::{META_SUFFIX, cache_key, is_cache_key, with_suffix};
use crate::common::fs::remove_path;
use crate::error::{Result, cache_operation_failed};
use crate::filesystem::FileSystem;

/// A fresh clone handed back by a [`Cloner`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOutput {
    /// Scratch directory holding the checked-out tree
    pub path: PathBuf,
    pub etag: Option<String>,
}

/// Clones a repository into a scratch directory
pub trait Cloner: Send + Sync {
    fn clone_repo(&self, url: &str, git_ref: Option<&str>) -> Result<CloneOutput>;

    /// Release a scratch directory returned by [`Cloner::clone_repo`]
    fn cleanup(&self, path: &Path);
}

/// Result of [`CloneCache::get_or_clone`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedClone {
    pub key: String,
    /// Location of the tree inside the cache
    pub path: PathBuf,
    pub etag: Option<String>,
    pub from_cache: bool,
}

/// Cloned trees under `<cache root>/clones`
pub struct CloneCache<'a> {
    fs: &'a dyn FileSystem,
    dir: PathBuf,
    ttl_ms: u64,
    clock: &'a dyn Clock,
}

impl<'a> CloneCache<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        dir: impl Into<PathBuf>,
        ttl_ms: u64,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            fs,
            dir: dir.into(),
            ttl_ms,
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached tree for `(url, ref)`, cloning on a miss or after expiry
    pub fn get_or_clone(
        &self,
        cloner: &dyn Cloner,
        url: &str,
        git_ref: Option<&str>,
    ) -> Result<CachedClone> {
        let key = cache_key(url, git_ref);
        let path = self.dir.join(&key);
        let meta_path = with_suffix(&self.dir, &key, META_SUFFIX);

        if let Some(meta) = read_meta(self.fs, &meta_path)
            && meta.is_fresh(self.clock.now_ms())
            && self.fs.exists(&path)
        {
            tracing::debug!(url, key, "clone cache hit");
            return Ok(CachedClone {
                key,
                path,
                etag: meta.etag,
                from_cache: true,
            });
        }

        tracing::debug!(url, key, "clone cache miss");
        let output = cloner.clone_repo(url, git_ref)?;
        let stored = self.store(&output.path, &path);
        cloner.cleanup(&output.path);
        stored?;

        let meta = CacheMeta::new(self.clock.now_ms(), self.ttl_ms, output.etag.clone());
        write_meta(self.fs, &meta_path, &meta)?;

        Ok(CachedClone {
            key,
            path,
            etag: output.etag,
            from_cache: false,
        })
    }

    fn store(&self, scratch: &Path, path: &Path) -> Result<()> {
        remove_path(self.fs, path).map_err(|e| {
            cache_operation_failed(format!(
                "Failed to remove stale clone {}: {e}",
                path.display()
            ))
        })?;
        self.fs.create_dir_all(&self.dir).map_err(|e| {
            cache_operation_failed(format!(
                "Failed to create cache directory {}: {e}",
                self.dir.display()
            ))
        })?;
        self.fs.copy_directory(scratch, path).map_err(|e| {
            cache_operation_failed(format!("Failed to store clone {}: {e}", path.display()))
        })
    }

    /// Drop one cached tree; failures are logged and ignored
    pub fn invalidate(&self, key: &str) {
        if !is_cache_key(key) {
            tracing::warn!(key, "refusing to invalidate malformed cache key");
            return;
        }
        for path in [
            self.dir.join(key),
            with_suffix(&self.dir, key, META_SUFFIX),
        ] {
            if let Err(e) = remove_path(self.fs, &path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove cache entry");
            }
        }
    }

    /// Drop every cached tree; failures are logged and ignored
    pub fn clear(&self) {
        if let Err(e) = remove_path(self.fs, &self.dir) {
            tracing::warn!(path = %self.dir.display(), error = %e, "failed to clear clone cache");
        }
    }
}
