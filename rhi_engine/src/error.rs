//! Error types for the RHI engine
//!
//! Only the resource-management and engine-singleton surfaces are fallible.
//! The command buffer core reports contract violations through assertions.

use std::fmt;

/// Result type for RHI engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// RHI engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Direct3D 10, mock, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (null handle, foreign renderer, wrong type, destroyed)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and build an `Error::BackendError` from the same message
///
/// # Example
///
/// ```no_run
/// # use rhi_engine::engine_err;
/// let error = engine_err!("rhi::d3d10", "Unsupported format {}", 42);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::rhi::Error::BackendError(message)
    }};
}

/// Log an error and return it as `Err(Error::BackendError)` from the current function
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
