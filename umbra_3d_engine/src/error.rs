//! Error types for the Umbra3D engine
//!
//! This module defines the error taxonomy used throughout the engine:
//! configuration mistakes, missing hardware capabilities, invalid
//! object state and failures reported by the graphics device.

use std::fmt;

/// Result type for Umbra3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Umbra3D engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid parameter or graph edit, rejected before any mutation
    /// (non-positive near distance, duplicate sibling name, self-parenting, ...)
    Configuration(String),

    /// Required hardware capability is missing
    Capability(String),

    /// Object queried in a state that does not allow it
    /// (e.g. shadow volumes requested before the edge list was built)
    State(String),

    /// Failure reported by the graphics device
    Backend(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::Capability(msg) => write!(f, "Missing capability: {}", msg),
            Error::State(msg) => write!(f, "Invalid state: {}", msg),
            Error::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build the matching `Error` variant
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("umbra3d::Frustum", Configuration, "Near distance must be > 0, got {}", near);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::umbra3d::Error::$variant(message)
    }};
}

/// Log an error and return it from the current function
///
/// # Example
///
/// ```ignore
/// engine_bail!("umbra3d::NodeGraph", Configuration, "Node '{}' cannot be its own child", name);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $variant, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
