//! Error handling module
//!
//! This module defines the error types and result type aliases used by the
//! TLS context manager. Local validation errors are raised before the engine
//! is touched; engine errors carry the reason string pulled from the OpenSSL
//! error queue at the point of failure.

use thiserror::Error;
use std::io;

/// TLS context error type
#[derive(Error, Debug)]
pub enum ContextError {
    /// Unrecognized protocol identifier
    #[error("invalid protocol: {0}")]
    InvalidProtocol(String),

    /// The engine could not allocate a native context
    #[error("error creating context ({0})")]
    ResourceExhausted(String),

    /// Mode other than "client" or "server"
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Unrecognized verification token
    #[error("invalid verify option '{token}' (argument #{position})")]
    InvalidVerifyOption { token: String, position: usize },

    /// Unrecognized protocol option token
    #[error("invalid option '{token}' (argument #{position})")]
    InvalidOption { token: String, position: usize },

    /// Unrecognized session cache mode token
    #[error("unknown session cache mode '{token}' (argument #{position})")]
    InvalidCacheMode { token: String, position: usize },

    /// Password argument that is neither absent, a string nor a callable
    #[error("invalid callback value: {0}")]
    InvalidPasswordArgument(String),

    /// Certificate chain rejected by the engine
    #[error("error loading certificate ({0})")]
    CertLoadFailed(String),

    /// Private key rejected by the engine
    #[error("error loading private key ({0})")]
    KeyLoadFailed(String),

    /// CA file or directory rejected by the engine
    #[error("error loading CA locations ({0})")]
    TrustLoadFailed(String),

    /// No usable cipher in the list
    #[error("error setting cipher list ({0})")]
    CipherListRejected(String),

    /// Session id context rejected by the engine
    #[error("error setting session id ({0})")]
    SessionIdRejected(String),

    /// Private key does not match the certificate
    #[error("private key does not match certificate ({0})")]
    KeyMismatch(String),

    /// Operation on a context that has already been destroyed
    #[error("context is closed")]
    Closed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `ContextError`.
pub type Result<T> = std::result::Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err: ContextError = io_err.into();

        match err {
            ContextError::Io(_) => {}
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ContextError::CertLoadFailed("no start line".to_string());
        assert_eq!(err.to_string(), "error loading certificate (no start line)");

        let err = ContextError::InvalidVerifyOption { token: "bogus".to_string(), position: 2 };
        assert!(err.to_string().contains("bogus"));
        assert!(err.to_string().contains("#2"));
    }
}
