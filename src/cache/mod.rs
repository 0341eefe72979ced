//! Source cache for cognit
//!
//! Two TTL caches sit upstream of fetch-type materialization so repeated
//! installs from the same source do not hit the network:
//! - [`CloneCache`]: cloned trees keyed by `(url, ref)`
//! - [`FetchCache`]: fetched text keyed by `url`
//!
//! Every artifact has a `<key>.meta.json` sidecar recording when it was
//! stored, its TTL and the upstream etag. Maintenance (`invalidate`, `clear`)
//! is best-effort and never fails the caller.

pub mod clone;
pub mod fetch;
pub mod meta;
pub mod paths;
pub mod stats;


use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

use crate::filesystem::FileSystem;

pub use clone::{CachedClone, CloneCache, CloneOutput, Cloner};
pub use fetch::{CachedFetch, FetchCache, FetchOutput, Fetcher};
pub use meta::CacheMeta;
pub use paths::{CLONES_DIR, FETCH_DIR, cache_key, cache_root, normalize_url};
pub use stats::CacheStats;

/// Default lifetime of a cached artifact
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Source of "now" for expiry decisions
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(now_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Both cache namespaces under one root
pub struct SourceCache<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    ttl: Duration,
    clock: &'a dyn Clock,
}

impl<'a> SourceCache<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        root: impl Into<PathBuf>,
        ttl: Duration,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            ttl,
            clock,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn clones(&self) -> CloneCache<'a> {
        CloneCache::new(self.fs, self.root.join(CLONES_DIR), self.ttl_ms(), self.clock)
    }

    pub fn fetches(&self) -> FetchCache<'a> {
        FetchCache::new(self.fs, self.root.join(FETCH_DIR), self.ttl_ms(), self.clock)
    }

    /// Artifact counts and bytes on disk
    pub fn stats(&self) -> CacheStats {
        let clones_dir = self.root.join(CLONES_DIR);
        let fetch_dir = self.root.join(FETCH_DIR);
        CacheStats {
            clones: stats::count_artifacts(self.fs, &clones_dir).0,
            fetches: stats::count_artifacts(self.fs, &fetch_dir).1,
            total_size: stats::dir_size(self.fs, &clones_dir) + stats::dir_size(self.fs, &fetch_dir),
        }
    }

    /// Empty both namespaces; failures are logged and ignored
    pub fn clear(&self) {
        self.clones().clear();
        self.fetches().clear();
    }
}
