//! API key models

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::filter::Record;
use serde::Serialize;
use strum::{AsRefStr, EnumString};

pub const STATUS_FACET: &str = "status";
pub const PERMISSION_FACET: &str = "permission";

const VISIBLE_PREFIX: usize = 12;
const VISIBLE_SUFFIX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    Send,
    Templates,
    Logs,
    Webhooks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub secret: String,
    /// Masked form of `secret` that is safe to display
    pub preview: String,
    pub permissions: Vec<Permission>,
    pub last_used: String,
    pub created_at: NaiveDate,
    pub status: KeyStatus,
}

impl ApiKey {
    pub fn new(
        id: &str,
        name: &str,
        secret: &str,
        permissions: Vec<Permission>,
        last_used: &str,
        created_at: NaiveDate,
        status: KeyStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            secret: secret.to_string(),
            preview: mask(secret),
            permissions,
            last_used: last_used.to_string(),
            created_at,
            status,
        }
    }
}

/// Keep the prefix and the last four characters, hide the rest
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= VISIBLE_PREFIX + VISIBLE_SUFFIX {
        return "•".repeat(chars.len());
    }

    let head: String = chars[..VISIBLE_PREFIX].iter().collect();
    let tail: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    format!("{}{}{}", head, "•".repeat(20), tail)
}

impl Record for ApiKey {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.preview.as_str()]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            STATUS_FACET => vec![self.status.as_ref()],
            PERMISSION_FACET => self.permissions.iter().map(AsRef::as_ref).collect(),
            _ => Vec::new(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.created_at.and_time(NaiveTime::MIN))
    }
}
