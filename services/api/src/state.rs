//! Application state shared across handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use auth::{AuthClient, LocalAuthClient, RemoteAuthClient, jwt::load_public_key};
use common::config::{AppConfig, AuthMode};
use tracing::info;

use crate::repositories::{
    Catalog,
    api_keys::{ApiKeyRepository, LocalApiKeys},
    templates::{LocalTemplates, TemplateRepository},
};
use crate::session::SessionRegistry;
use crate::support::{LocalTicketDesk, TicketClient};
use crate::views::Paging;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_client: Arc<dyn AuthClient>,
    pub sessions: SessionRegistry,
    pub tickets: Arc<dyn TicketClient>,
    pub templates: Arc<dyn TemplateRepository>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub catalog: Arc<Catalog>,
    pub paging: Paging,
}

impl AppState {
    pub fn new(
        auth_client: Arc<dyn AuthClient>,
        tickets: Arc<dyn TicketClient>,
        templates: Arc<dyn TemplateRepository>,
        api_keys: Arc<dyn ApiKeyRepository>,
        catalog: Catalog,
        paging: Paging,
    ) -> Self {
        Self {
            sessions: SessionRegistry::new(auth_client.clone()),
            auth_client,
            tickets,
            templates,
            api_keys,
            catalog: Arc::new(catalog),
            paging,
        }
    }

    /// Wire up the configured auth backend and the in-memory demo backends
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let latency = Duration::from_millis(config.simulated_latency_ms);

        let auth_client: Arc<dyn AuthClient> = match config.auth_mode {
            AuthMode::Local => {
                info!("Using local auth client with demo accounts");
                Arc::new(LocalAuthClient::with_demo_accounts(latency)?)
            }
            AuthMode::Remote => {
                let key = config
                    .jwt_public_key
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("jwt_public_key is required in remote mode"))?;
                let pem = load_public_key(key)?;
                info!("Using remote auth service at {}", config.auth_base_url);
                Arc::new(RemoteAuthClient::new(&config.auth_base_url, &pem)?)
            }
        };

        Ok(Self::new(
            auth_client,
            Arc::new(LocalTicketDesk::new(latency)),
            Arc::new(LocalTemplates::seeded(latency)?),
            Arc::new(LocalApiKeys::seeded(latency)?),
            Catalog::seeded()?,
            Paging::from(config),
        ))
    }
}
