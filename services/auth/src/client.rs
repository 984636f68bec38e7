//! Seam between the session provider and the authentication backend

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::models::{LoginCredentials, NewAccount, Session};

/// Backend that turns credentials into sessions
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Authenticate `credentials` and mint a session
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session>;

    /// Create an account and mint a session for it
    async fn register(&self, account: &NewAccount) -> AuthResult<Session>;

    /// Ask the backend to send a password reset email
    ///
    /// Succeeds for unknown addresses too, so callers cannot tell which accounts exist.
    async fn request_password_reset(&self, email: &str) -> AuthResult<()>;
}
