//! Configuration module for the OTPFlow console
//!
//! Settings are read from `OTPFLOW_*` environment variables through the
//! `config` crate, falling back to defaults suited to local development.

use serde::Deserialize;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};

/// Which `AuthClient` implementation backs the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// In-process account directory seeded with demo accounts
    Local,
    /// Upstream authentication service reached over HTTP
    Remote,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to
    pub bind_address: String,
    /// Authentication backend
    pub auth_mode: AuthMode,
    /// Base URL of the upstream authentication service (remote mode)
    pub auth_base_url: String,
    /// RS256 public key, inline PEM or path to a PEM file (remote mode)
    #[serde(default)]
    pub jwt_public_key: Option<String>,
    /// Page size used when a listing request does not ask for one
    pub default_page_size: u32,
    /// Upper bound applied to requested page sizes
    pub max_page_size: u32,
    /// Artificial latency added by the local auth client, in milliseconds
    pub simulated_latency_ms: u64,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `OTPFLOW_BIND_ADDRESS`: listen address (default: "0.0.0.0:3000")
    /// - `OTPFLOW_AUTH_MODE`: `local` or `remote` (default: "local")
    /// - `OTPFLOW_AUTH_BASE_URL`: upstream auth URL (default: "http://localhost:3001")
    /// - `OTPFLOW_JWT_PUBLIC_KEY`: PEM or PEM file path, required in remote mode
    /// - `OTPFLOW_DEFAULT_PAGE_SIZE`: default listing page size (default: 10)
    /// - `OTPFLOW_MAX_PAGE_SIZE`: maximum listing page size (default: 100)
    /// - `OTPFLOW_SIMULATED_LATENCY_MS`: local auth latency (default: 0)
    pub fn from_env() -> ConfigResult<Self> {
        let settings = config::Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("auth_mode", "local")?
            .set_default("auth_base_url", "http://localhost:3001")?
            .set_default("default_page_size", 10_i64)?
            .set_default("max_page_size", 100_i64)?
            .set_default("simulated_latency_ms", 0_i64)?
            .add_source(config::Environment::with_prefix("OTPFLOW").try_parsing(true))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;

        info!(
            "Configuration loaded: bind_address={}, auth_mode={:?}",
            config.bind_address, config.auth_mode
        );

        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "max_page_size",
                message: "must be at least 1".to_string(),
            });
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid {
                key: "default_page_size",
                message: format!("must be between 1 and {}", self.max_page_size),
            });
        }

        if self.auth_mode == AuthMode::Remote && self.jwt_public_key.is_none() {
            return Err(ConfigError::Invalid {
                key: "jwt_public_key",
                message: "required when auth_mode is remote".to_string(),
            });
        }

        Ok(())
    }
}
