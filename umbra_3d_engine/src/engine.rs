/// Process-wide logging slot.
///
/// The logger is the only global state held by the engine. Everything
/// render related (scratch lists, light caches, render context) lives in
/// the objects that own a frame and is never shared through statics.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger_slot() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::new())))
}

// ===== PUBLIC API =====

/// Owner of the installed `Logger`.
///
/// # Example
///
/// ```
/// use umbra_3d_engine::umbra3d::Engine;
/// use umbra_3d_engine::umbra3d::log::{DefaultLogger, LogSeverity};
///
/// Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Debug));
/// Engine::reset_logger();
/// ```
pub struct Engine;

impl Engine {
    /// Route every subsequent entry to `logger`.
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        Self::replace_logger(Box::new(logger));
    }

    /// Go back to the console `DefaultLogger`.
    pub fn reset_logger() {
        Self::replace_logger(Box::new(DefaultLogger::new()));
    }

    /// Emit an entry without source location (`engine_trace!` .. `engine_warn!`).
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Emit an entry carrying `file:line` (`engine_error!`).
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    fn replace_logger(logger: Box<dyn Logger>) {
        // A poisoned slot keeps its previous logger
        if let Ok(mut slot) = logger_slot().write() {
            *slot = logger;
        }
    }

    fn dispatch(entry: LogEntry) {
        if let Ok(slot) = logger_slot().read() {
            slot.log(&entry);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
