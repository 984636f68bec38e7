//! Support tickets
//!
//! Tickets are validated here and handed to a [`TicketClient`]. The console
//! ships with [`LocalTicketDesk`], which only issues ticket ids.

use std::time::Duration;

use async_trait::async_trait;
use auth::validation::{ValidationErrors, validate_email, validate_required};
use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TicketCategory {
    Technical,
    Billing,
    Api,
    Feature,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Support form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: String,
    pub priority: String,
    pub message: String,
}

/// Validated support ticket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupportTicket {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub message: String,
}

impl TicketForm {
    /// Check every field, collecting all failures
    pub fn validate(self) -> Result<SupportTicket, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check("name", validate_required(&self.name, "Name is required"));
        errors.check("email", validate_email(&self.email));
        errors.check("subject", validate_required(&self.subject, "Subject is required"));
        errors.check("message", validate_required(&self.message, "Message is required"));

        let category = match self.category.trim() {
            "" => {
                errors.add("category", "Category is required");
                None
            }
            value => value.parse::<TicketCategory>().ok().or_else(|| {
                errors.add("category", format!("Unknown category: {}", value));
                None
            }),
        };

        let priority = match self.priority.trim() {
            "" => Some(TicketPriority::default()),
            value => value.parse::<TicketPriority>().ok().or_else(|| {
                errors.add("priority", format!("Unknown priority: {}", value));
                None
            }),
        };

        match (category, priority) {
            (Some(category), Some(priority)) if errors.is_empty() => Ok(SupportTicket {
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                subject: self.subject.trim().to_string(),
                category,
                priority,
                message: self.message.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Confirmation handed back once a ticket is accepted
#[derive(Debug, Clone, Serialize)]
pub struct TicketReceipt {
    pub ticket_id: String,
    pub priority: TicketPriority,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    #[error("Support desk unavailable: {0}")]
    Unavailable(String),
}

/// Destination of validated tickets
#[async_trait]
pub trait TicketClient: Send + Sync {
    async fn submit(&self, ticket: &SupportTicket) -> Result<TicketReceipt, TicketError>;
}

/// Ticket desk that accepts every ticket and issues `TKT-<year>-<6 digits>` ids
pub struct LocalTicketDesk {
    latency: Duration,
}

impl LocalTicketDesk {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl TicketClient for LocalTicketDesk {
    async fn submit(&self, ticket: &SupportTicket) -> Result<TicketReceipt, TicketError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let submitted_at = Utc::now();
        let serial: u32 = rand::thread_rng().gen_range(0..1_000_000);
        let ticket_id = format!("TKT-{}-{:06}", submitted_at.year(), serial);

        info!(
            "Support ticket {} opened by {} ({}, {})",
            ticket_id,
            ticket.email,
            ticket.category.as_ref(),
            ticket.priority.as_ref()
        );

        Ok(TicketReceipt {
            ticket_id,
            priority: ticket.priority,
            submitted_at,
        })
    }
}
