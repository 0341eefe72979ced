//! Configuration errors

use super::CognitError;

/// Creates the error returned when a project-scoped path has no project root
pub fn project_root_required() -> CognitError {
    CognitError::ProjectRootRequired
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> CognitError {
    CognitError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> CognitError {
    CognitError::ConfigInvalid {
        message: message.into(),
    }
}
