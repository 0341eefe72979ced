//! Cache path utilities and constants
//!
//! ```text
//! <cache root>/
//! ├── clones/
//! │   ├── <key>/              cloned tree
//! │   └── <key>.meta.json
//! └── fetch/
//!     ├── <key>.content
//!     └── <key>.meta.json
//! ```

use std::path::{Path, PathBuf};

use crate::env::EnvReader;
use crate::hash::content_hash;

/// Environment variable overriding the cache root
pub const CACHE_DIR_ENV: &str = "COGNIT_CACHE_DIR";

/// Subdirectory for cloned trees
pub const CLONES_DIR: &str = "clones";

/// Subdirectory for fetched text
pub const FETCH_DIR: &str = "fetch";

/// Suffix of the metadata sidecar next to each artifact
pub const META_SUFFIX: &str = ".meta.json";

/// Suffix of fetched content files
pub const CONTENT_SUFFIX: &str = ".content";

/// Length of a cache key in hex characters
pub const KEY_LEN: usize = 16;

/// Cache root: `$COGNIT_CACHE_DIR`, else `<home>/.cache/cognit`
pub fn cache_root(env: &dyn EnvReader, home: &Path) -> PathBuf {
    match env.var(CACHE_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => home.join(".cache").join("cognit"),
    }
}

/// Canonical form of a source URL for keying
///
/// Example: " https://GitHub.com/Acme/Skills.git/ " -> "https://github.com/acme/skills"
pub fn normalize_url(url: &str) -> String {
    let mut url = url.trim().to_lowercase();
    loop {
        if let Some(stripped) = url.strip_suffix('/') {
            url = stripped.to_string();
        } else if let Some(stripped) = url.strip_suffix(".git") {
            url = stripped.to_string();
        } else {
            return url;
        }
    }
}

/// First 16 hex characters of `sha256(normalize(url) + "#" + ref)`
pub fn cache_key(url: &str, git_ref: Option<&str>) -> String {
    let input = format!("{}#{}", normalize_url(url), git_ref.unwrap_or(""));
    let mut key = content_hash(input.as_bytes());
    key.truncate(KEY_LEN);
    key
}

/// Whether `key` looks like a key produced by [`cache_key`]
pub fn is_cache_key(key: &str) -> bool {
    key.len() == KEY_LEN && key.bytes().all(|b| b.is_ascii_hexdigit())
}

pub(crate) fn with_suffix(dir: &Path, key: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{key}{suffix}"))
}
