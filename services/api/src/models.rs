//! API models for request and response payloads and the listed records

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub mod admin;
pub mod api_key;
pub mod delivery;
pub mod template;

/// Delivery channel of an OTP message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    Whatsapp,
    Email,
    Sms,
}

/// Request to send a password reset email
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
