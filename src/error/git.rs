//! Git and network errors

use super::{CognitError, NetworkErrorKind};

/// Creates a clone failed error
pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> CognitError {
    CognitError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a classified network error
pub fn network(
    operation: impl Into<String>,
    kind: NetworkErrorKind,
    message: impl Into<String>,
) -> CognitError {
    CognitError::Network {
        operation: operation.into(),
        kind,
        message: message.into(),
    }
}
