//! Error types for authentication operations

use thiserror::Error;

/// Error raised by an `AuthClient` or the session provider
///
/// Every variant is recoverable: the caller reports it and may retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown account or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration for an email that already has an account
    #[error("An account with email {0} already exists")]
    EmailTaken(String),

    /// The attempt was abandoned before it completed
    #[error("Authentication attempt was cancelled")]
    Cancelled,

    /// The authentication backend could not be reached
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    /// The backend returned a token that failed verification
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Anything else, e.g. password hashing failures
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

/// Type alias for Result with AuthError
pub type AuthResult<T> = Result<T, AuthError>;
