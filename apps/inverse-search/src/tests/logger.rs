// Unit tests for logger initialization
// Only one test may install the global logger; everything else stays pure

use crate::logger::{default_log_dir, initialize};

use tempfile::TempDir;

/// **VALUE**: Calling initialize() twice is harmless.
///
/// **WHY THIS MATTERS**: fern panics if a global logger is installed twice. A second
/// call from any code path would crash the callback before it forwards the click.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable log directory
    let dir = TempDir::new().expect("Failed to create temp dir");

    // WHEN: Calling initialize twice
    let first = initialize(dir.path());
    let second = initialize(dir.path());

    // THEN: Both succeed and the log file exists
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
    assert!(dir.path().join("inverse-search.log").exists());
}

#[test]
fn given_any_platform_when_default_log_dir_then_ends_in_app_dir() {
    let dir = default_log_dir();

    assert_eq!(
        dir.file_name().and_then(|name| name.to_str()),
        Some("synctex-bridge")
    );
}
