//! Git operations for cloning sources
//!
//! [`GitCloner`] is the default clone collaborator of the source cache. It
//! clones into a scratch directory, checks out the requested ref and reports
//! the resolved commit SHA as the artifact's etag.
//!
//! Authentication is delegated entirely to git's native system:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Environment variables (`GIT_SSH_COMMAND`, etc.)

pub mod auth;
pub mod error;
pub mod refs;
pub mod url;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use git2::{FetchOptions, RemoteCallbacks, Repository, build::RepoBuilder};

use crate::cache::{CloneOutput, Cloner};
use crate::env::EnvReader;
use crate::error::{Result, cache_operation_failed};

/// Environment variable overriding the scratch directory for clones
pub const TMPDIR_ENV: &str = "COGNIT_TMPDIR";

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// System temp dir, never relative (a relative `TMPDIR` would land clones
/// under the current directory)
pub(crate) fn default_scratch_base() -> PathBuf {
    let dir = std::env::temp_dir();
    if dir.is_absolute() {
        dir
    } else if cfg!(windows) {
        PathBuf::from("C:\\Windows\\Temp")
    } else {
        PathBuf::from("/tmp")
    }
}

/// Clones repositories with libgit2
#[derive(Debug, Clone)]
pub struct GitCloner {
    scratch_base: PathBuf,
}

impl GitCloner {
    pub fn new(scratch_base: impl Into<PathBuf>) -> Self {
        Self {
            scratch_base: scratch_base.into(),
        }
    }

    /// Scratch directory from `COGNIT_TMPDIR`, else the system temp dir
    pub fn from_env(env: &dyn EnvReader) -> Self {
        let base = env
            .var(TMPDIR_ENV)
            .map(PathBuf::from)
            .filter(|p| p.is_absolute())
            .unwrap_or_else(default_scratch_base);
        Self::new(base)
    }

    pub fn scratch_base(&self) -> &Path {
        &self.scratch_base
    }

    fn scratch_dir(&self) -> Result<PathBuf> {
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = self
            .scratch_base
            .join(format!("cognit-clone-{}-{n}", std::process::id()));
        std::fs::create_dir_all(&dir).map_err(|e| {
            cache_operation_failed(format!(
                "Failed to create scratch directory {}: {e}",
                dir.display()
            ))
        })?;
        Ok(dir)
    }

    fn clone_into(&self, url: &str, git_ref: Option<&str>, target: &Path) -> Result<String> {
        let mut callbacks = RemoteCallbacks::new();
        auth::setup_auth_callbacks(&mut callbacks);
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        // A shallow clone can only serve the default branch
        if git_ref.is_none() && !url::is_local_url(url) {
            fetch_options.depth(1);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        let repo: Repository = builder
            .clone(&url::normalize_for_clone(url), target)
            .map_err(|e| error::to_cognit_error(url, &e))?;

        match git_ref {
            Some(refname) => {
                let commit = refs::resolve_reference(&repo, url, refname)?;
                refs::checkout_commit(&repo, url, &commit)?;
                Ok(commit.id().to_string())
            }
            None => refs::head_sha(&repo, url),
        }
    }
}

impl Cloner for GitCloner {
    fn clone_repo(&self, url: &str, git_ref: Option<&str>) -> Result<CloneOutput> {
        let path = self.scratch_dir()?;
        tracing::debug!(url, git_ref, path = %path.display(), "cloning");
        match self.clone_into(url, git_ref, &path) {
            Ok(sha) => Ok(CloneOutput {
                path,
                etag: Some(sha),
            }),
            Err(e) => {
                self.cleanup(&path);
                Err(e)
            }
        }
    }

    fn cleanup(&self, path: &Path) {
        if let Err(e) = std::fs::remove_dir_all(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove clone scratch directory");
        }
    }
}
