//! API key repository

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use auth::validation::{ValidationErrors, validate_required};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{StoreError, date};
use crate::models::api_key::{ApiKey, KeyStatus, Permission};

const LIVE_KEY_PREFIX: &str = "otpf_live_";

/// Key creation form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiKeyForm {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Validated key request
#[derive(Debug, Clone, PartialEq)]
pub struct NewApiKey {
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl ApiKeyForm {
    pub fn validate(self) -> Result<NewApiKey, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", validate_required(&self.name, "Key name is required"));

        let mut permissions = Vec::new();
        for value in &self.permissions {
            match value.trim().parse::<Permission>() {
                Ok(permission) if !permissions.contains(&permission) => permissions.push(permission),
                Ok(_) => {}
                Err(_) => errors.add("permissions", format!("Unknown permission: {}", value)),
            }
        }
        if self.permissions.is_empty() {
            errors.add("permissions", "Select at least one permission");
        }

        errors.into_result()?;
        Ok(NewApiKey {
            name: self.name.trim().to_string(),
            permissions,
        })
    }
}

/// Freshly created key; the only response that carries the full secret
#[derive(Debug, Clone, Serialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub key: ApiKey,
    pub secret: String,
}

/// Storage of the account's API keys
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<ApiKey>, StoreError>;

    async fn create(&self, key: &NewApiKey) -> Result<CreatedApiKey, StoreError>;

    /// Revoke a key; revoking a revoked key returns it unchanged
    async fn revoke(&self, id: &str) -> Result<ApiKey, StoreError>;
}

/// In-memory API keys, seeded with the demo set
pub struct LocalApiKeys {
    keys: RwLock<Vec<ApiKey>>,
    latency: Duration,
}

impl LocalApiKeys {
    pub fn new(keys: Vec<ApiKey>, latency: Duration) -> Self {
        Self {
            keys: RwLock::new(keys),
            latency,
        }
    }

    pub fn seeded(latency: Duration) -> Result<Self> {
        Ok(Self::new(seed()?, latency))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// `otpf_live_` followed by 32 random hex digits
fn generate_secret() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    let hex: String = bytes.iter().map(|byte| format!("{:02x}", byte)).collect();
    format!("{}{}", LIVE_KEY_PREFIX, hex)
}

#[async_trait]
impl ApiKeyRepository for LocalApiKeys {
    async fn list(&self) -> Result<Vec<ApiKey>, StoreError> {
        Ok(self.keys.read().await.clone())
    }

    async fn create(&self, key: &NewApiKey) -> Result<CreatedApiKey, StoreError> {
        self.simulate_latency().await;

        let mut keys = self.keys.write().await;
        let id = keys
            .iter()
            .filter_map(|key| key.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let secret = generate_secret();
        let created = ApiKey::new(
            &id.to_string(),
            &key.name,
            &secret,
            key.permissions.clone(),
            "Never",
            Utc::now().date_naive(),
            KeyStatus::Active,
        );

        info!("API key {} created ({})", created.id, created.name);
        keys.push(created.clone());
        Ok(CreatedApiKey {
            key: created,
            secret,
        })
    }

    async fn revoke(&self, id: &str) -> Result<ApiKey, StoreError> {
        self.simulate_latency().await;

        let mut keys = self.keys.write().await;
        let key = keys
            .iter_mut()
            .find(|key| key.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("API key {}", id)))?;

        match key.status {
            KeyStatus::Active => {
                key.status = KeyStatus::Revoked;
                info!("API key {} revoked", id);
            }
            KeyStatus::Revoked => debug!("API key {} already revoked", id),
        }
        Ok(key.clone())
    }
}

/// API keys shown by a fresh console
pub fn seed() -> Result<Vec<ApiKey>> {
    Ok(vec![
        ApiKey::new(
            "1",
            "Production API Key",
            "otpf_live_1234567890abcdef1234567890abcdef",
            vec![Permission::Send, Permission::Templates, Permission::Logs],
            "2 hours ago",
            date("2024-01-10")?,
            KeyStatus::Active,
        ),
        ApiKey::new(
            "2",
            "Development Key",
            "otpf_test_abcdef1234567890abcdef1234567890",
            vec![Permission::Send, Permission::Templates],
            "1 day ago",
            date("2024-01-08")?,
            KeyStatus::Active,
        ),
        ApiKey::new(
            "3",
            "Legacy Key",
            "otpf_live_fedcba0987654321fedcba0987654321",
            vec![Permission::Send],
            "Never",
            date("2024-01-01")?,
            KeyStatus::Revoked,
        ),
    ])
}
