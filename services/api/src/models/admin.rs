//! Admin console models

use auth::Role;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::filter::Record;
use serde::Serialize;
use strum::AsRefStr;

pub const PLAN_FACET: &str = "plan";
pub const STATUS_FACET: &str = "status";
pub const LEVEL_FACET: &str = "level";
pub const CATEGORY_FACET: &str = "category";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
    Pending,
}

/// Customer account as listed in the admin console
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: Plan,
    pub status: AccountStatus,
    pub joined_at: NaiveDate,
    pub last_active: String,
    pub otps_sent: u64,
    pub role: Role,
}

impl Record for ConsoleUser {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            PLAN_FACET => vec![self.plan.as_ref()],
            STATUS_FACET => vec![self.status.as_ref()],
            _ => Vec::new(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.joined_at.and_time(NaiveTime::MIN))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Security,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogCategory {
    Auth,
    Api,
    System,
    Security,
    Billing,
}

/// Platform event recorded for administrators
#[derive(Debug, Clone, Serialize)]
pub struct SystemLog {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub level: LogLevel,
    pub category: LogCategory,
    pub message: String,
    pub user: Option<String>,
    pub ip: Option<String>,
    pub details: serde_json::Value,
}

impl Record for SystemLog {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.message.as_str()];
        fields.extend(self.user.as_deref());
        fields.extend(self.ip.as_deref());
        fields
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            LEVEL_FACET => vec![self.level.as_ref()],
            CATEGORY_FACET => vec![self.category.as_ref()],
            _ => Vec::new(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.timestamp)
    }
}
