//! Platform errors

use super::CognitError;

/// Creates a platform not supported error
pub fn not_supported(platform: impl Into<String>) -> CognitError {
    CognitError::PlatformNotSupported {
        platform: platform.into(),
    }
}
