//! Cache errors

use super::CognitError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> CognitError {
    CognitError::CacheOperationFailed {
        message: message.into(),
    }
}
