//! TTL cache of fetched text documents

use std::path::{Path, PathBuf};

use super::Clock;
use super::meta::{CacheMeta, read_meta, write_meta};
use super::paths::{CONTENT_SUFFIX, META_SUFFIX, cache_key, is_cache_key, with_suffix};
use crate::common::fs::{atomic_write, remove_path};
use crate::error::Result;
use crate::filesystem::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub content: String,
    pub etag: Option<String>,
}

/// Fetches a text document over the network
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchOutput>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFetch {
    pub key: String,
    pub content: String,
    pub etag: Option<String>,
    pub from_cache: bool,
}

/// Fetched documents under `<cache root>/fetch`
pub struct FetchCache<'a> {
    fs: &'a dyn FileSystem,
    dir: PathBuf,
    ttl_ms: u64,
    clock: &'a dyn Clock,
}

impl<'a> FetchCache<'a> {
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

    /// Cached document for `url`, fetching on a miss or after expiry
    pub fn get_or_fetch(&self, fetcher: &dyn Fetcher, url: &str) -> Result<CachedFetch> {
        let key = cache_key(url, None);
        let content_path = with_suffix(&self.dir, &key, CONTENT_SUFFIX);
        let meta_path = with_suffix(&self.dir, &key, META_SUFFIX);

        if let Some(meta) = read_meta(self.fs, &meta_path)
            && meta.is_fresh(self.clock.now_ms())
        {
            match self.fs.read_to_string(&content_path) {
                Ok(content) => {
                    tracing::debug!(url, key, "fetch cache hit");
                    return Ok(CachedFetch {
                        key,
                        content,
                        etag: meta.etag,
                        from_cache: true,
                    });
                }
                Err(e) => {
                    tracing::debug!(url, key, error = %e, "fetch cache content unreadable");
                }
            }
        }

        tracing::debug!(url, key, "fetch cache miss");
        let output = fetcher.fetch(url)?;
        atomic_write(self.fs, &content_path, output.content.as_bytes())?;
        let meta = CacheMeta::new(self.clock.now_ms(), self.ttl_ms, output.etag.clone());
        write_meta(self.fs, &meta_path, &meta)?;

        Ok(CachedFetch {
            key,
            content: output.content,
            etag: output.etag,
            from_cache: false,
        })
    }

    /// Drop one cached document; failures are logged and ignored
    pub fn invalidate(&self, key: &str) {
        if !is_cache_key(key) {
            tracing::warn!(key, "refusing to invalidate malformed cache key");
            return;
        }
        for suffix in [CONTENT_SUFFIX, META_SUFFIX] {
            let path = with_suffix(&self.dir, key, suffix);
            if let Err(e) = remove_path(self.fs, &path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove cache entry");
            }
        }
    }

    /// Drop every cached document; failures are logged and ignored
    pub fn clear(&self) {
        if let Err(e) = remove_path(self.fs, &self.dir) {
            tracing::warn!(path = %self.dir.display(), error = %e, "failed to clear fetch cache");
        }
    }
}
