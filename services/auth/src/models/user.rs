//! User model and related functionality

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Account held by the local directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// User login credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account creation payload, after form validation
#[derive(Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub company: Option<String>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("company", &self.company)
            .finish()
    }
}

/// Registration form as submitted by the browser
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub company: String,
    pub agree_to_terms: bool,
}

impl RegistrationForm {
    /// Drop the confirmation fields once the form has been validated
    pub fn into_account(self) -> NewAccount {
        let company = self.company.trim();
        NewAccount {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            company: (!company.is_empty()).then(|| company.to_string()),
            password: self.password,
        }
    }
}
