//! Error types for the signature crate

use core::fmt;

/// Errors that can occur during signature operations
#[derive(Debug, Clone)]
pub enum Error {
    /// Invalid key
    InvalidKey(String),

    /// Invalid signature
    InvalidSignature(String),

    /// Invalid parameter
    InvalidParameter(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Error::InvalidSignature(msg) => write!(f, "Invalid signature: {}", msg),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<koblitz_algorithms::Error> for Error {
    fn from(err: koblitz_algorithms::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

/// Result type for signature operations
pub type Result<T> = std::result::Result<T, Error>;
