//! JWT verification for tokens issued by the upstream authentication service
//!
//! Tokens are signed with RS256; only the public key is needed here.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::models::Role;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// User permissions
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Display name, when the issuer includes it
    #[serde(default)]
    pub name: Option<String>,
    /// Email address, when the issuer includes it
    #[serde(default)]
    pub email: Option<String>,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

impl Claims {
    /// Console role granted by the token's `roles` claim
    pub fn role(&self) -> Role {
        let is_admin = self
            .roles
            .iter()
            .any(|role| matches!(role.parse::<Role>(), Ok(Role::Admin)));

        if is_admin { Role::Admin } else { Role::User }
    }
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Verifies RS256 access tokens
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from a PEM encoded RSA public key
    pub fn from_rsa_pem(public_key: &str) -> AuthResult<Self> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes()).map_err(|e| {
            error!("Failed to create decoding key: {}", e);
            AuthError::Internal(format!("Invalid public key: {}", e))
        })?;

        let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
        validation.validate_exp = true;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Validate an access token and return its claims
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;

        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken(
                "expected an access token".to_string(),
            ));
        }

        Ok(claims)
    }
}

/// Resolve a public key setting that is either inline PEM or a path to a PEM file
///
/// Relative paths are tried against the working directory first, then the
/// crate root.
pub fn load_public_key(value: &str) -> Result<String> {
    if value.trim_start().starts_with("-----BEGIN") {
        return Ok(value.to_string());
    }

    let pem = std::fs::read_to_string(value)
        .or_else(|_| {
            let mut path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
            path.push(value);
            std::fs::read_to_string(path)
        })
        .map_err(|e| anyhow::anyhow!("Failed to read public key file {}: {}", value, e))?;

    Ok(pem.trim().to_string())
}
