//! Error types for the platform authenticator bridge.

use serde::{Deserialize, Serialize};

/// Result type alias for authenticator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during credential ceremonies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", content = "message")]
pub enum Error {
    /// No user-verifying platform authenticator on this device.
    #[error("Platform authenticator not available: {0}")]
    NotAvailable(String),

    /// User failed verification (wrong fingerprint, face mismatch, etc.)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested credential is not known to this authenticator.
    #[error("Credential not found")]
    CredentialNotFound,

    /// User dismissed the prompt.
    #[error("User cancelled authentication")]
    UserCancelled,

    /// The ceremony did not finish within the requested timeout.
    #[error("Authenticator timed out")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(String),

    /// Platform-specific internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
