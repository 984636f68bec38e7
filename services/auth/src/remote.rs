//! Auth client for an upstream authentication service
//!
//! Credentials are posted to the upstream over HTTP; the returned access
//! token is verified locally before a session is minted from its claims.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::client::AuthClient;
use crate::error::{AuthError, AuthResult};
use crate::jwt::TokenVerifier;
use crate::models::{LoginCredentials, NewAccount, Session};

/// Response body of the upstream login and register endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    company: Option<&'a str>,
}

#[derive(Serialize)]
struct PasswordResetRequest<'a> {
    email: &'a str,
}

/// Auth client talking to an upstream authentication service
#[derive(Clone)]
pub struct RemoteAuthClient {
    http: reqwest::Client,
    base_url: String,
    verifier: TokenVerifier,
}

impl RemoteAuthClient {
    /// Create a client for the service at `base_url`, trusting `public_key` (PEM)
    pub fn new(base_url: &str, public_key: &str) -> AuthResult<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            verifier: TokenVerifier::from_rsa_pem(public_key)?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AuthResult<reqwest::Response> {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Request to auth service failed: {}", e);
                AuthError::Unavailable(e.to_string())
            })
    }

    async fn session_from_response(
        &self,
        response: reqwest::Response,
        fallback_email: &str,
    ) -> AuthResult<Session> {
        let tokens: TokenResponse = response.json().await.map_err(|e| {
            error!("Malformed auth service response: {}", e);
            AuthError::Unavailable(format!("malformed response: {}", e))
        })?;

        let claims = self.verifier.verify(&tokens.access_token)?;
        let email = claims
            .email
            .clone()
            .unwrap_or_else(|| fallback_email.to_string());

        Ok(Session {
            token: tokens.access_token,
            user_id: claims.sub,
            name: claims.name.clone().unwrap_or_else(|| email.clone()),
            email,
            avatar_url: None,
            role: claims.role(),
            created_at: Utc::now(),
        })
    }
}

fn rejection(status: StatusCode, email: &str) -> AuthError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::InvalidCredentials,
        StatusCode::CONFLICT => AuthError::EmailTaken(email.to_string()),
        status => AuthError::Unavailable(format!("auth service returned {}", status)),
    }
}

#[async_trait]
impl AuthClient for RemoteAuthClient {
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session> {
        info!("Forwarding login for {} to auth service", credentials.email);

        let response = self
            .post(
                "/auth/login",
                &LoginRequest {
                    username: &credentials.email,
                    password: &credentials.password,
                },
            )
            .await?;

        if !response.status().is_success() {
            warn!(
                "Auth service rejected login for {}: {}",
                credentials.email,
                response.status()
            );
            return Err(rejection(response.status(), &credentials.email));
        }

        self.session_from_response(response, &credentials.email)
            .await
    }

    async fn register(&self, account: &NewAccount) -> AuthResult<Session> {
        info!("Forwarding registration for {} to auth service", account.email);

        let response = self
            .post(
                "/auth/register",
                &RegisterRequest {
                    name: &account.name,
                    email: &account.email,
                    password: &account.password,
                    company: account.company.as_deref(),
                },
            )
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response.status(), &account.email));
        }

        self.session_from_response(response, &account.email).await
    }

    async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        let response = self
            .post("/auth/password-reset", &PasswordResetRequest { email })
            .await?;

        // Unknown addresses are not an error for the caller.
        match response.status() {
            status if status.is_success() || status == StatusCode::NOT_FOUND => Ok(()),
            status => Err(rejection(status, email)),
        }
    }
}
