//! Installation errors

use std::path::Path;

use super::CognitError;

/// Creates an unsafe name error
pub fn unsafe_name(name: impl Into<String>, reason: impl Into<String>) -> CognitError {
    CognitError::UnsafeName {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Creates a symlink failed error
pub fn symlink_failed(link: &Path, reason: impl Into<String>) -> CognitError {
    CognitError::SymlinkFailed {
        link: link.display().to_string(),
        reason: reason.into(),
    }
}

/// Wraps an I/O failure while writing `path`
pub fn write_failed(path: &Path, source: std::io::Error) -> CognitError {
    CognitError::WriteFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Creates a cyclic symlink error
pub fn cyclic_symlink(path: &Path) -> CognitError {
    CognitError::CyclicSymlink {
        path: path.display().to_string(),
    }
}

/// Creates a generic install failure
pub fn install_failed(name: impl Into<String>, message: impl Into<String>) -> CognitError {
    CognitError::InstallFailed {
        name: name.into(),
        message: message.into(),
    }
}

/// Creates the error for a name missing from the lock file
pub fn not_installed(name: impl Into<String>) -> CognitError {
    CognitError::NotInstalled { name: name.into() }
}
