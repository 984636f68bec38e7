//! In-process account directory
//!
//! Backs the console when no upstream authentication service is configured.
//! Accounts live in memory for the lifetime of the process and passwords are
//! stored as argon2 hashes.

use std::collections::HashMap;
use std::time::Duration;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::client::AuthClient;
use crate::error::{AuthError, AuthResult};
use crate::models::{LoginCredentials, NewAccount, Role, Session, User};

/// Email of the seeded demo user account
pub const DEMO_USER_EMAIL: &str = "demo@otpflow.io";
/// Email of the seeded demo admin account
pub const DEMO_ADMIN_EMAIL: &str = "admin@otpflow.io";
/// Password shared by both seeded accounts
pub const DEMO_PASSWORD: &str = "Otpflow#2024";

/// Auth client backed by an in-memory account directory
pub struct LocalAuthClient {
    users: RwLock<HashMap<String, User>>,
    latency: Duration,
}

impl LocalAuthClient {
    /// Create an empty directory; every call waits `latency` before answering
    pub fn new(latency: Duration) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            latency,
        }
    }

    /// Create a directory holding the demo user and demo admin accounts
    pub fn with_demo_accounts(latency: Duration) -> AuthResult<Self> {
        let mut client = Self::new(latency);
        let users = client.users.get_mut();

        insert_account(
            users,
            &NewAccount {
                name: "Demo User".to_string(),
                email: DEMO_USER_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
                company: Some("OTPFlow".to_string()),
            },
            Role::User,
        )?;
        insert_account(
            users,
            &NewAccount {
                name: "Demo Admin".to_string(),
                email: DEMO_ADMIN_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
                company: Some("OTPFlow".to_string()),
            },
            Role::Admin,
        )?;

        info!("Local account directory seeded with demo accounts");
        Ok(client)
    }

    /// Add an account with an explicit role
    pub async fn add_account(&self, account: &NewAccount, role: Role) -> AuthResult<User> {
        let mut users = self.users.write().await;
        insert_account(&mut users, account, role)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl AuthClient for LocalAuthClient {
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Session> {
        self.simulate_latency().await;

        let user = self
            .users
            .read()
            .await
            .get(&directory_key(&credentials.email))
            .cloned();

        match user {
            Some(user) if verify_password(&user, &credentials.password)? => {
                info!("Local login succeeded for {}", user.email);
                Ok(session_for(&user))
            }
            _ => {
                warn!("Local login rejected for {}", credentials.email);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn register(&self, account: &NewAccount) -> AuthResult<Session> {
        self.simulate_latency().await;

        let user = self.add_account(account, Role::User).await?;
        Ok(session_for(&user))
    }

    async fn request_password_reset(&self, email: &str) -> AuthResult<()> {
        self.simulate_latency().await;

        let known = self
            .users
            .read()
            .await
            .contains_key(&directory_key(email));
        info!("Password reset requested for {} (known: {})", email, known);

        Ok(())
    }
}

fn insert_account(
    users: &mut HashMap<String, User>,
    account: &NewAccount,
    role: Role,
) -> AuthResult<User> {
    let key = directory_key(&account.email);
    if users.contains_key(&key) {
        return Err(AuthError::EmailTaken(account.email.clone()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: account.name.clone(),
        email: account.email.trim().to_string(),
        password_hash: hash_password(&account.password)?,
        company: account.company.clone(),
        avatar_url: None,
        role,
        created_at: Utc::now(),
    };

    info!("Created {} account {}", role, user.email);
    users.insert(key, user.clone());
    Ok(user)
}

fn directory_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// Lighter than the argon2 defaults: this directory only backs development
// and demo deployments.
fn hasher() -> AuthResult<Argon2<'static>> {
    let params = Params::new(8 * 1024, 2, 1, None)
        .map_err(|e| AuthError::Internal(format!("Invalid argon2 parameters: {}", e)))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AuthError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(hasher()?
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn session_for(user: &User) -> Session {
    Session {
        token: Uuid::new_v4().simple().to_string(),
        user_id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        avatar_url: user.avatar_url.clone(),
        role: user.role,
        created_at: Utc::now(),
    }
}
