//! Error types and handling for cognit
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Configuration errors
//! - [`install`]: Installation errors
//! - [`fs`]: File system errors
//! - [`lockfile`]: Lock file errors
//! - [`cache`]: Cache errors
//! - [`git`]: Git and network errors
//! - [`platform`]: Platform errors

pub mod cache;
pub mod config;
pub mod fs;
pub mod git;
pub mod install;
pub mod lockfile;
pub mod platform;

#[cfg(test)]
mod tests;

pub use cache::operation_failed as cache_operation_failed;
pub use config::{
    invalid as config_invalid, parse_failed as config_parse_failed,
    project_root_required,
};
pub use fs::{io_error, not_found as file_not_found, read_failed as file_read_failed};
pub use git::{clone_failed, network};
pub use install::{
    cyclic_symlink, install_failed, not_installed, symlink_failed, unsafe_name, write_failed,
};
pub use lockfile::{invalid_entry_name, unsupported_version};
pub use platform::not_supported as platform_not_supported;

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Failure classes reported by network-bound collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    ConnectionReset,
    ConnectionRefused,
    /// Generic fetch-layer failure (DNS, TLS, HTTP transport)
    Fetch,
    /// The operation was aborted on purpose
    Cancelled,
    /// Anything else; never retried
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Timeout => "timeout",
            Self::ConnectionReset => "connection reset",
            Self::ConnectionRefused => "connection refused",
            Self::Fetch => "fetch failed",
            Self::Cancelled => "cancelled",
            Self::Other => "error",
        };
        f.write_str(label)
    }
}

/// Main error type for cognit operations
#[derive(Error, Diagnostic, Debug)]
pub enum CognitError {
    // Configuration errors
    #[error("A project root is required for project-scoped paths")]
    #[diagnostic(
        code(cognit::config::project_root_required),
        help("Run the command inside a project or pass --global")
    )]
    ProjectRootRequired,

    #[error("Could not determine the home directory")]
    #[diagnostic(code(cognit::config::home_unavailable))]
    HomeDirUnavailable,

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(cognit::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(cognit::config::invalid))]
    ConfigInvalid { message: String },

    // Install errors
    #[error("Unsafe name '{name}': {reason}")]
    #[diagnostic(
        code(cognit::install::unsafe_name),
        help("Names may not contain path separators, '..' or control characters")
    )]
    UnsafeName { name: String, reason: String },

    #[error("Failed to create symlink at {link}: {reason}")]
    #[diagnostic(code(cognit::install::symlink_failed))]
    SymlinkFailed { link: String, reason: String },

    #[error("Failed to write file: {}", path.display())]
    #[diagnostic(code(cognit::install::write_failed))]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Symlink cycle detected at {path}")]
    #[diagnostic(code(cognit::install::cyclic_symlink))]
    CyclicSymlink { path: String },

    #[error("Failed to install '{name}': {message}")]
    #[diagnostic(code(cognit::install::failed))]
    InstallFailed { name: String, message: String },

    #[error("'{name}' is not installed")]
    #[diagnostic(
        code(cognit::install::not_installed),
        help("Run 'cognit list' to see the installed cognitives")
    )]
    NotInstalled { name: String },

    // Platform errors
    #[error("Platform not supported: {platform}")]
    #[diagnostic(
        code(cognit::platform::not_supported),
        help("Run 'cognit list --platforms' to see the configured platforms")
    )]
    PlatformNotSupported { platform: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(cognit::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    #[diagnostic(code(cognit::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(cognit::fs::io_error))]
    IoError { message: String },

    // Lock file errors
    #[error("Unsupported lock file version: {version}")]
    #[diagnostic(code(cognit::lockfile::unsupported_version))]
    UnsupportedLockVersion { version: String },

    #[error("Invalid lock entry name '{name}'")]
    #[diagnostic(code(cognit::lockfile::invalid_name))]
    InvalidLockEntryName { name: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(cognit::cache::operation_failed))]
    CacheOperationFailed { message: String },

    // Git and network errors
    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(cognit::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("{operation} failed ({kind}): {message}")]
    #[diagnostic(code(cognit::net::failed))]
    Network {
        operation: String,
        kind: NetworkErrorKind,
        message: String,
    },
}

impl CognitError {
    /// Whether retrying the failed operation may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CognitError::Network {
                kind: NetworkErrorKind::Timeout
                    | NetworkErrorKind::ConnectionReset
                    | NetworkErrorKind::ConnectionRefused
                    | NetworkErrorKind::Fetch,
                ..
            }
        )
    }
}

impl From<std::io::Error> for CognitError {
    fn from(err: std::io::Error) -> Self {
        CognitError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CognitError {
    fn from(err: serde_yaml::Error) -> Self {
        CognitError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CognitError {
    fn from(err: serde_json::Error) -> Self {
        CognitError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for CognitError {
    fn from(err: inquire::InquireError) -> Self {
        CognitError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CognitError>;
