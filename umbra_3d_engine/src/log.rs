//! Engine diagnostics.
//!
//! Components log through the `engine_*!` macros with a source tag. The
//! entries go to whichever `Logger` is installed in `Engine`, a colored
//! console logger by default.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for engine diagnostics.
///
/// Install one with `Engine::set_logger` to send entries to a file, a test
/// capture buffer or an editor console.
///
/// ```ignore
/// use umbra_3d_engine::umbra3d::log::{Logger, LogEntry};
///
/// struct FrameLog(std::sync::Mutex<Vec<String>>);
///
/// impl Logger for FrameLog {
///     fn log(&self, entry: &LogEntry) {
///         self.0.lock().unwrap().push(entry.message.clone());
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Process one entry. Called with the logger slot read-locked.
    fn log(&self, entry: &LogEntry);
}

/// One diagnostic emitted by the engine.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. "umbra3d::Frustum"
    pub source: String,
    pub message: String,
    /// Emitting file, set for errors only
    pub file: Option<&'static str>,
    /// Emitting line, set for errors only
    pub line: Option<u32>,
}

/// Severity of an entry, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame detail (frame stats, volume counts)
    Trace,
    /// Per-configuration detail (shadow texture layouts)
    Debug,
    /// One-off events such as a camera switched to an infinite far plane
    Info,
    /// Degraded behaviour, e.g. a shadow technique downgraded
    Warn,
    /// Every constructed `Error`, with file and line
    Error,
}

impl LogSeverity {
    /// Fixed-width console label.
    fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colorize(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Console logger, used until `Engine::set_logger` installs another one.
///
/// Lines read `[timestamp] [SEVERITY] [source] message`, with ` (file:line)`
/// appended for errors. Entries below the threshold are dropped; the
/// renderer traces every frame, so the default threshold is `Info`.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLogger {
    min_severity: LogSeverity,
}

impl DefaultLogger {
    pub fn new() -> Self {
        Self::with_min_severity(LogSeverity::Info)
    }

    pub fn with_min_severity(min_severity: LogSeverity) -> Self {
        Self { min_severity }
    }

    pub fn min_severity(&self) -> LogSeverity {
        self.min_severity
    }

    /// The console line for `entry`, without colors.
    pub fn format_plain(entry: &LogEntry) -> String {
        Self::format_line(entry, entry.severity.label(), &entry.source)
    }

    fn format_line(entry: &LogEntry, severity: impl std::fmt::Display, source: impl std::fmt::Display) -> String {
        let local: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            local.format("%Y-%m-%d %H:%M:%S%.3f"),
            severity,
            source,
            entry.message
        );
        if let (Some(file), Some(number)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, number));
        }
        line
    }
}

impl Default for DefaultLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity >= self.min_severity {
            println!("{}", Self::format_line(entry, entry.severity.colorize(), entry.source.bright_blue()));
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```ignore
/// engine_trace!("umbra3d::NodeGraph", "Updating node {}", name);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::umbra3d::Engine::log(
            $crate::umbra3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```ignore
/// engine_debug!("umbra3d::SceneRenderer", "{} shadow casters for light {:?}", count, light);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::umbra3d::Engine::log(
            $crate::umbra3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
///
/// # Example
///
/// ```ignore
/// engine_info!("umbra3d::SceneRenderer", "Infinite far plane enabled for stencil shadows");
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::umbra3d::Engine::log(
            $crate::umbra3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
///
/// # Example
///
/// ```ignore
/// engine_warn!("umbra3d::ShadowStrategies", "Two-sided stencil unavailable, using two passes");
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::umbra3d::Engine::log(
            $crate::umbra3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```ignore
/// engine_error!("umbra3d::Scene", "Unknown object key {:?}", key);
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::umbra3d::Engine::log_detailed(
            $crate::umbra3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}
