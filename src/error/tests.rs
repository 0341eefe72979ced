//! Error type tests
//!
//! Tests for CognitError enum, its constructors and conversions.

#![allow(clippy::expect_used)]

use std::error::Error;
use std::path::Path;

use miette::Diagnostic;

use super::*;

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_code() {
    let err = unsafe_name("../etc", "path traversal");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("cognit::install::unsafe_name".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: CognitError = io_err.into();
    assert!(matches!(err, CognitError::IoError { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("invalid json content");
    let err: CognitError = parse_result.unwrap_err().into();
    assert!(matches!(err, CognitError::ConfigParseFailed { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let err: CognitError = parse_result.unwrap_err().into();
    assert!(matches!(err, CognitError::ConfigParseFailed { .. }));
}

#[test]
fn test_write_failed_keeps_cause_and_path() {
    let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = write_failed(Path::new("/store/skills/x/SKILL.md"), cause);
    assert!(err.to_string().contains("/store/skills/x/SKILL.md"));
    let source = err.source().expect("write error carries its cause");
    assert!(source.to_string().contains("denied"));
}

#[test]
fn test_transient_classification() {
    for kind in [
        NetworkErrorKind::Timeout,
        NetworkErrorKind::ConnectionReset,
        NetworkErrorKind::ConnectionRefused,
        NetworkErrorKind::Fetch,
    ] {
        assert!(network("clone", kind, "boom").is_transient(), "{kind}");
    }
    assert!(!network("clone", NetworkErrorKind::Cancelled, "stop").is_transient());
    assert!(!network("clone", NetworkErrorKind::Other, "bad").is_transient());
    assert!(!clone_failed("https://x/y.git", "auth").is_transient());
}

test_error_contains!(
    test_project_root_required,
    project_root_required(),
    "project root"
);

test_error_contains!(
    test_unsafe_name,
    unsafe_name("a/b", "contains a path separator"),
    "Unsafe name 'a/b'",
    "path separator"
);

test_error_contains!(
    test_symlink_failed,
    symlink_failed(Path::new("/p/.claude/skills/x"), "permission denied"),
    "Failed to create symlink",
    "/p/.claude/skills/x"
);

test_error_contains!(
    test_cyclic_symlink,
    cyclic_symlink(Path::new("/loop")),
    "Symlink cycle",
    "/loop"
);

test_error_contains!(
    test_install_failed,
    install_failed("my-skill", "disk full"),
    "my-skill",
    "disk full"
);

test_error_contains!(
    test_not_installed,
    not_installed("my-skill"),
    "'my-skill' is not installed"
);

test_error_contains!(
    test_unsupported_version,
    unsupported_version("9"),
    "Unsupported lock file version: 9"
);

test_error_contains!(
    test_invalid_entry_name,
    invalid_entry_name(""),
    "Invalid lock entry name"
);

test_error_contains!(
    test_cache_operation_failed,
    cache_operation_failed("cache directory missing"),
    "Cache operation failed"
);

test_error_contains!(
    test_config_parse_failed,
    config_parse_failed("/p/.agents/cognit/config.yaml", "invalid YAML"),
    "Failed to parse configuration file"
);

test_error_contains!(
    test_config_invalid,
    config_invalid("retry.max_delay_ms must be >= base_delay_ms"),
    "Invalid configuration"
);

test_error_contains!(
    test_file_not_found,
    file_not_found("/path/to/file.txt"),
    "File not found"
);

test_error_contains!(
    test_file_read_failed,
    file_read_failed("/path/to/file.txt", "permission denied"),
    "Failed to read file"
);

test_error_contains!(test_io_error, io_error("some error"), "IO error");

test_error_contains!(
    test_platform_not_supported,
    platform_not_supported("notepad"),
    "Platform not supported: notepad"
);

test_error_contains!(
    test_network_error,
    network("fetch", NetworkErrorKind::Timeout, "no response"),
    "fetch failed (timeout)"
);
