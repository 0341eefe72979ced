//! File system errors

use super::CognitError;

/// Creates a file not found error
pub fn not_found(path: impl Into<String>) -> CognitError {
    CognitError::FileNotFound { path: path.into() }
}

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> CognitError {
    CognitError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> CognitError {
    CognitError::IoError {
        message: message.into(),
    }
}
