//! Session provider: the current session of one browser
//!
//! The provider is passed explicitly to whoever needs it. Readers take a
//! snapshot with [`SessionProvider::current_session`] or follow changes through
//! [`SessionProvider::subscribe`]. A login publishes its session only once the
//! backend has answered, so readers never observe a half-finished attempt.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::AuthClient;
use crate::error::{AuthError, AuthResult};
use crate::models::{LoginCredentials, NewAccount, Session};

/// Holds and mutates the current session of one browser
pub struct SessionProvider {
    client: Arc<dyn AuthClient>,
    state: watch::Sender<Option<Session>>,
}

impl SessionProvider {
    /// Create a provider with no session
    pub fn new(client: Arc<dyn AuthClient>) -> Self {
        let (state, _) = watch::channel(None);
        Self { client, state }
    }

    /// Create a provider that starts out holding `session`
    pub fn with_session(client: Arc<dyn AuthClient>, session: Session) -> Self {
        let (state, _) = watch::channel(Some(session));
        Self { client, state }
    }

    /// Snapshot of the current session
    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Receiver notified whenever the session changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    /// Authenticate and, on success, replace the current session
    ///
    /// On failure the previous session (or its absence) is left untouched.
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session> {
        info!("Login attempt for {}", credentials.email);

        match self.client.login(credentials).await {
            Ok(session) => {
                info!("Login succeeded for {} as {}", session.email, session.role);
                self.state.send_replace(Some(session.clone()));
                Ok(session)
            }
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.email, e);
                Err(e)
            }
        }
    }

    /// Like [`login`](Self::login), abandoned as soon as `cancel` fires
    pub async fn login_until_cancelled(
        &self,
        credentials: &LoginCredentials,
        cancel: &CancellationToken,
    ) -> AuthResult<Session> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Login attempt for {} cancelled", credentials.email);
                Err(AuthError::Cancelled)
            }
            result = self.login(credentials) => result,
        }
    }

    /// Create an account and sign in as it
    pub async fn register(&self, account: &NewAccount) -> AuthResult<Session> {
        info!("Registration attempt for {}", account.email);

        let session = self.client.register(account).await.inspect_err(|e| {
            warn!("Registration failed for {}: {}", account.email, e);
        })?;

        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Ask the backend to send a password reset email
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        self.client.request_password_reset(email).await
    }

    /// Drop the current session; a no-op when there is none
    pub fn logout(&self) {
        let mut previous = None;
        self.state.send_if_modified(|current| {
            previous = current.take();
            previous.is_some()
        });

        match previous {
            Some(session) => info!("Logged out {}", session.email),
            None => debug!("Logout without a session"),
        }
    }
}
