//! Error types for the Galaxy3D frame graph
//!
//! One error enum covers the whole crate: caller mistakes caught while describing
//! render passes, and failures reported by the native backend.

use std::fmt;

/// Result type for frame graph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Frame graph errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Native call failed (message carries subsystem and native result code)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown handle, wrong backend object, disposed stage, ...)
    InvalidResource(String),

    /// Initialization failed (device, swapchain, subsystems)
    InitializationFailed(String),

    /// Render pass description rejected (bad format, sample count, reference, dependency)
    ValidationError(String),
}

impl Error {
    /// True for caller mistakes detected before touching the backend
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::ValidationError(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
