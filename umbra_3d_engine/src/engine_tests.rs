//! Unit tests for the Engine logging slot
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] to run sequentially.

use crate::umbra3d::Engine;
use crate::umbra3d::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        // Other tests may log concurrently; keep only entries from this file
        if entry.source == "test" || entry.source == "umbra3d::test" {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

// ============================================================================
// LOGGING API TESTS
// ============================================================================

#[test]
#[serial]
fn test_default_logger_logs_without_panic() {
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Test message".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warning message".to_string());
    Engine::log_detailed(LogSeverity::Error, "test", "Error message".to_string(), "x.rs", 1);
}

#[test]
#[serial]
fn test_set_custom_logger_receives_all_severities() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log(LogSeverity::Trace, "test", "Trace".to_string());
    Engine::log(LogSeverity::Debug, "test", "Debug".to_string());
    Engine::log(LogSeverity::Info, "test", "Info".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warn".to_string());
    Engine::log(LogSeverity::Error, "test", "Error".to_string());

    Engine::reset_logger();
    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].severity, LogSeverity::Trace);
    assert_eq!(entries[4].message, "Error");
    assert!(entries.iter().all(|e| e.file.is_none()));
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    Engine::log(LogSeverity::Info, "test", "After reset".to_string());

    assert!(entries.lock().unwrap().is_empty());
}

#[test]
#[serial]
fn test_log_detailed_with_file_line() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "umbra3d::test",
        "Detailed error".to_string(),
        "test.rs",
        42,
    );

    Engine::reset_logger();
    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source, "umbra3d::test");
    assert_eq!(entries[0].file, Some("test.rs"));
    assert_eq!(entries[0].line, Some(42));
}

#[test]
#[serial]
fn test_macros_route_through_engine() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    crate::engine_debug!("umbra3d::test", "value {}", 3);
    crate::engine_warn!("umbra3d::test", "careful");
    crate::engine_error!("umbra3d::test", "broken {}", "thing");

    Engine::reset_logger();
    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].message, "value 3");
    assert_eq!(entries[1].severity, LogSeverity::Warn);
    assert_eq!(entries[2].message, "broken thing");
    assert!(entries[2].file.is_some());
    assert!(entries[2].line.is_some());
}
