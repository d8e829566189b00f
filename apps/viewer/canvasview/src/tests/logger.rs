// Unit tests for logger module initialization logic
// The guards are global process state, so the whole lifecycle is exercised in
// one serialized test with a deterministic call order

use crate::logger::initialize;

use std::path::Path;

use serial_test::serial;

/// **VALUE**: Verifies the full initialization lifecycle: a failing first
/// attempt returns an error, and every later call is an idempotent Ok.
///
/// **WHY THIS MATTERS**: Logger initialization can be reached from multiple
/// code paths (setup, tests). If a second call panicked or errored, it would
/// crash the viewer during startup; if a failing first call panicked, a bad
/// log directory would take the whole process down.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped
/// instead of propagated, and would catch removal of the Once/AtomicBool
/// guards (fern panics when a global logger is set twice).
#[test]
#[serial]
fn given_failing_then_valid_dirs_when_initialized_then_error_then_idempotent_ok() {
    // GIVEN: A path that cannot hold a log file
    let invalid_dir = Path::new("/dev/null/invalid-path");

    // WHEN: The first (and only real) initialization attempt runs
    let first = initialize(invalid_dir);

    // THEN: The failure is an error, not a panic
    assert!(first.is_err(), "invalid log directory must error");
    let message = format!("{:?}", first.unwrap_err());
    assert!(
        message.contains("Viewer"),
        "error should be the viewer setup variant"
    );

    // WHEN: Initialization is attempted again, now with a valid directory
    let temp_dir = std::env::temp_dir().join("canvasview-test-logger");
    std::fs::create_dir_all(&temp_dir).expect("temp dir");
    let second = initialize(&temp_dir);
    let third = initialize(&temp_dir);

    // THEN: The attempted-guard makes every later call an Ok no-op
    assert!(second.is_ok(), "subsequent calls are idempotent");
    assert!(third.is_ok(), "subsequent calls are idempotent");

    std::fs::remove_dir_all(&temp_dir).ok();
}
