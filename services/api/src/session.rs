//! Browser sessions
//!
//! Every browser is identified by the `otpflow_sid` cookie and owns one
//! [`SessionProvider`]. Providers are created on first sign-in attempt and
//! dropped again on logout.

use std::collections::HashMap;
use std::sync::Arc;

use auth::{AuthClient, Session, SessionProvider};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Name of the cookie carrying the browser id
pub const SESSION_COOKIE: &str = "otpflow_sid";

/// Browser identity attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrowserId(pub Uuid);

impl BrowserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a cookie value; anything but a UUID is ignored
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }
}

/// Session providers keyed by browser
#[derive(Clone)]
pub struct SessionRegistry {
    client: Arc<dyn AuthClient>,
    providers: Arc<RwLock<HashMap<BrowserId, Arc<SessionProvider>>>>,
}

impl SessionRegistry {
    /// Create an empty registry whose providers authenticate through `client`
    pub fn new(client: Arc<dyn AuthClient>) -> Self {
        Self {
            client,
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Provider for `browser`, created on first use
    pub async fn provider(&self, browser: BrowserId) -> Arc<SessionProvider> {
        if let Some(provider) = self.providers.read().await.get(&browser) {
            return provider.clone();
        }

        let mut providers = self.providers.write().await;
        providers
            .entry(browser)
            .or_insert_with(|| {
                debug!("Creating session provider for browser {}", browser.0);
                Arc::new(SessionProvider::new(self.client.clone()))
            })
            .clone()
    }

    /// Current session of `browser`, if signed in
    pub async fn current_session(&self, browser: BrowserId) -> Option<Session> {
        self.providers
            .read()
            .await
            .get(&browser)
            .and_then(|provider| provider.current_session())
    }

    /// Give back `handle` after a failed attempt and drop the provider of
    /// `browser` unless it holds a session or another request still uses it
    pub async fn discard_if_anonymous(&self, browser: BrowserId, handle: Arc<SessionProvider>) {
        drop(handle);

        let mut providers = self.providers.write().await;
        let unused = providers.get(&browser).is_some_and(|provider| {
            Arc::strong_count(provider) == 1 && !provider.is_authenticated()
        });
        if unused {
            debug!("Discarding session provider for browser {}", browser.0);
            providers.remove(&browser);
        }
    }

    /// Log `browser` out and forget its provider; a no-op when signed out
    pub async fn end(&self, browser: BrowserId) {
        let provider = self.providers.write().await.remove(&browser);

        match provider {
            Some(provider) => {
                provider.logout();
                info!("Ended session for browser {}", browser.0);
            }
            None => debug!("No session to end for browser {}", browser.0),
        }
    }

    /// Number of browsers with a provider
    pub async fn len(&self) -> usize {
        self.providers.read().await.len()
    }
}
