//! Binding error types
//!
//! Engine and validation failures are not errors at this level: they are
//! reported to the host as ordinary `(false, message)` results. A
//! `BindingError` is what the host raises instead of returning.

use thiserror::Error;

/// Result type for host calls
pub type BindingResult<T> = Result<T, BindingError>;

/// Host-level failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindingError {
    /// Argument of the wrong kind
    #[error("bad argument #{position} to '{method}' ({message})")]
    BadArgument {
        method: String,
        /// 1-based, counting the context itself as argument #1 for methods
        position: usize,
        message: String,
    },

    /// Method not in the context's method table
    #[error("unknown method '{0}'")]
    UnknownMethod(String),
}

impl BindingError {
    pub(crate) fn bad_argument(method: &str, position: usize, message: impl Into<String>) -> Self {
        BindingError::BadArgument {
            method: method.to_string(),
            position,
            message: message.into(),
        }
    }
}
