//! Classification of libgit2 failures
//!
//! Network-class failures become [`CognitError::Network`] so the retry layer
//! can decide whether to try again; everything else is a plain clone failure.

use git2::{Error, ErrorClass, ErrorCode};

use crate::error::{CognitError, NetworkErrorKind, clone_failed, network};

/// What a libgit2 error means to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitFailure {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    Network(NetworkErrorKind),
    Certificate,
    Other,
}

type Check = fn(&str, ErrorClass, ErrorCode) -> bool;

/// Checked in order; the first match wins
const CLASSIFICATIONS: &[(Check, GitFailure)] = &[
    (
        |_, _, code| code == ErrorCode::User,
        GitFailure::Network(NetworkErrorKind::Cancelled),
    ),
    (
        |msg, _, code| {
            code == ErrorCode::NotFound
                || msg.contains("not found")
                || msg.contains("404")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        GitFailure::RepositoryNotFound,
    ),
    (
        |msg, _, code| {
            code == ErrorCode::Auth || msg.contains("authentication") || msg.contains("credentials")
        },
        GitFailure::AuthenticationFailed,
    ),
    (
        |msg, _, _| msg.contains("permission denied") || msg.contains("access denied"),
        GitFailure::PermissionDenied,
    ),
    (
        |msg, _, _| msg.contains("timed out") || msg.contains("timeout"),
        GitFailure::Network(NetworkErrorKind::Timeout),
    ),
    (
        |msg, _, _| msg.contains("connection reset") || msg.contains("broken pipe"),
        GitFailure::Network(NetworkErrorKind::ConnectionReset),
    ),
    (
        |msg, _, _| msg.contains("connection refused") || msg.contains("failed to connect"),
        GitFailure::Network(NetworkErrorKind::ConnectionRefused),
    ),
    (
        |msg, _, _| msg.contains("certificate") || msg.contains("ssl"),
        GitFailure::Certificate,
    ),
    (
        |msg, class, _| {
            matches!(class, ErrorClass::Net | ErrorClass::Http)
                || msg.contains("network")
                || msg.contains("could not resolve host")
        },
        GitFailure::Network(NetworkErrorKind::Fetch),
    ),
];

pub fn classify(err: &Error) -> GitFailure {
    let message = err.message().to_lowercase();
    CLASSIFICATIONS
        .iter()
        .find(|(check, _)| check(&message, err.class(), err.code()))
        .map_or(GitFailure::Other, |(_, failure)| *failure)
}

/// Human-readable reason for a libgit2 error
pub fn interpret_git_error(err: &Error) -> String {
    match classify(err) {
        GitFailure::RepositoryNotFound => "Repository not found".to_string(),
        GitFailure::AuthenticationFailed => "Authentication failed".to_string(),
        GitFailure::PermissionDenied => "Permission denied".to_string(),
        GitFailure::Certificate => format!("Certificate error: {}", err.message()),
        GitFailure::Network(kind) => format!("Network error ({kind}): {}", err.message()),
        GitFailure::Other => err.message().to_string(),
    }
}

/// Convert a libgit2 error raised while cloning `url`
pub fn to_cognit_error(url: &str, err: &Error) -> CognitError {
    match classify(err) {
        GitFailure::Network(kind) => network("clone", kind, format!("{url}: {}", err.message())),
        _ => clone_failed(url, interpret_git_error(err)),
    }
}
