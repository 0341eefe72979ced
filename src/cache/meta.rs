//! Metadata sidecar stored next to every cached artifact

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::fs::atomic_write;
use crate::error::Result;
use crate::filesystem::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMeta {
    /// Milliseconds since the Unix epoch
    pub created_at: i64,
    pub ttl_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl CacheMeta {
    pub fn new(created_at: i64, ttl_ms: u64, etag: Option<String>) -> Self {
        Self {
            created_at,
            ttl_ms,
            etag,
        }
    }

    /// `now - createdAt < ttlMs`
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        u64::try_from(now_ms.saturating_sub(self.created_at)).is_ok_and(|age| age < self.ttl_ms)
    }
}

/// Sidecar at `path`; a missing or unreadable sidecar is a miss
pub fn read_meta(fs: &dyn FileSystem, path: &Path) -> Option<CacheMeta> {
    let content = fs.read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(meta) => Some(meta),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "ignoring corrupt cache metadata");
            None
        }
    }
}

pub fn write_meta(fs: &dyn FileSystem, path: &Path, meta: &CacheMeta) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    atomic_write(fs, path, json.as_bytes())
}
