//! Message template models

use chrono::NaiveDate;
use common::filter::Record;
use serde::Serialize;
use strum::{AsRefStr, EnumString};

use super::Channel;

pub const CHANNEL_FACET: &str = "channel";
pub const STATUS_FACET: &str = "status";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TemplateStatus {
    Active,
    Draft,
}

/// Template owned by the signed-in account
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub channel: Channel,
    pub message: String,
    pub variables: Vec<String>,
    pub is_default: bool,
    pub created_at: NaiveDate,
    pub last_used: String,
    pub usage_count: u64,
    pub status: TemplateStatus,
}

impl Record for Template {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.message.as_str()]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            CHANNEL_FACET => vec![self.channel.as_ref()],
            STATUS_FACET => vec![self.status.as_ref()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

/// Template submitted by a customer, as seen by the admin review queue
#[derive(Debug, Clone, Serialize)]
pub struct ReviewTemplate {
    pub id: String,
    pub name: String,
    pub channel: Channel,
    pub message: String,
    pub variables: Vec<String>,
    pub created_by: String,
    pub created_at: NaiveDate,
    pub status: ReviewStatus,
    pub usage_count: u64,
    pub report_count: u32,
}

impl Record for ReviewTemplate {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.message.as_str(),
            self.created_by.as_str(),
        ]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            CHANNEL_FACET => vec![self.channel.as_ref()],
            STATUS_FACET => vec![self.status.as_ref()],
            _ => Vec::new(),
        }
    }
}
