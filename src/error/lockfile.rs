//! Lock file errors

use super::CognitError;

/// Creates an unsupported version error
pub fn unsupported_version(version: impl Into<String>) -> CognitError {
    CognitError::UnsupportedLockVersion {
        version: version.into(),
    }
}

/// Creates an invalid entry name error
pub fn invalid_entry_name(name: impl Into<String>) -> CognitError {
    CognitError::InvalidLockEntryName { name: name.into() }
}
