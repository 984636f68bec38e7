//! Record collections behind the listing views
//!
//! [`Catalog`] holds the read-only collections. Templates and API keys are
//! edited from the dashboard and live behind the repositories in
//! [`templates`] and [`api_keys`].

use anyhow::{Context, Result};
use auth::Role;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::models::{
    Channel,
    admin::{AccountStatus, ConsoleUser, LogCategory, LogLevel, Plan, SystemLog},
    delivery::{DeliveryLog, DeliveryStatus, DeliverySummary, template_slug},
    template::{ReviewStatus, ReviewTemplate},
};

pub mod api_keys;
pub mod templates;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Failure of a repository call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read-only collections the console lists
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub delivery_logs: Vec<DeliveryLog>,
    pub users: Vec<ConsoleUser>,
    pub review_templates: Vec<ReviewTemplate>,
    pub system_logs: Vec<SystemLog>,
}

impl Catalog {
    /// Catalog holding the demo data shown by a fresh console
    pub fn seeded() -> Result<Self> {
        let catalog = Self {
            delivery_logs: delivery_logs()?,
            users: users()?,
            review_templates: review_templates()?,
            system_logs: system_logs()?,
        };

        info!(
            "Seeded catalog: {} delivery logs, {} users, {} review templates, {} system logs",
            catalog.delivery_logs.len(),
            catalog.users.len(),
            catalog.review_templates.len(),
            catalog.system_logs.len()
        );

        Ok(catalog)
    }

    pub fn delivery_summary(&self) -> DeliverySummary {
        DeliverySummary::from_logs(&self.delivery_logs)
    }
}

fn timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid seed timestamp: {}", value))
}

fn date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid seed date: {}", value))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn delivery(
    id: &str,
    at: &str,
    to: &str,
    channel: Channel,
    template: &str,
    status: DeliveryStatus,
    delivery_time_secs: Option<f64>,
    cost: f64,
    user_id: &str,
    user_agent: &str,
    ip_address: &str,
) -> Result<DeliveryLog> {
    Ok(DeliveryLog {
        id: id.to_string(),
        timestamp: timestamp(at)?,
        to: to.to_string(),
        channel,
        template: template.to_string(),
        template_slug: template_slug(template),
        status,
        delivery_time_secs,
        cost,
        user_id: user_id.to_string(),
        user_agent: user_agent.to_string(),
        ip_address: ip_address.to_string(),
        error_message: None,
    })
}

fn delivery_logs() -> Result<Vec<DeliveryLog>> {
    use Channel::*;
    use DeliveryStatus::*;

    let mut failed = delivery(
        "3",
        "2024-01-15 14:25:42",
        "+966509876543",
        Sms,
        "Password Reset",
        Failed,
        None,
        0.0,
        "user_789",
        "Safari/17.0",
        "172.16.0.1",
    )?;
    failed.error_message = Some("Invalid phone number".to_string());

    Ok(vec![
        delivery(
            "1",
            "2024-01-15 14:30:25",
            "+966501234567",
            Whatsapp,
            "Login OTP",
            Delivered,
            Some(2.3),
            0.05,
            "user_123",
            "Mozilla/5.0",
            "192.168.1.1",
        )?,
        delivery(
            "2",
            "2024-01-15 14:28:15",
            "user@example.com",
            Email,
            "Registration OTP",
            Delivered,
            Some(12.1),
            0.01,
            "user_456",
            "Chrome/120.0",
            "10.0.0.1",
        )?,
        failed,
        delivery(
            "4",
            "2024-01-15 14:22:18",
            "+966512345678",
            Whatsapp,
            "Payment Confirmation",
            Pending,
            None,
            0.05,
            "user_101",
            "Firefox/121.0",
            "203.0.113.1",
        )?,
        delivery(
            "5",
            "2024-01-15 14:20:05",
            "admin@company.com",
            Email,
            "Admin Alert",
            Delivered,
            Some(8.7),
            0.01,
            "user_202",
            "Edge/120.0",
            "198.51.100.1",
        )?,
    ])
}

fn users() -> Result<Vec<ConsoleUser>> {
    let user = |id: &str,
                name: &str,
                email: &str,
                plan: Plan,
                status: AccountStatus,
                joined: &str,
                last_active: &str,
                otps_sent: u64|
     -> Result<ConsoleUser> {
        Ok(ConsoleUser {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            plan,
            status,
            joined_at: date(joined)?,
            last_active: last_active.to_string(),
            otps_sent,
            role: Role::User,
        })
    };

    Ok(vec![
        user(
            "1",
            "Ahmed Al-Rashid",
            "ahmed@techcorp.sa",
            Plan::Pro,
            AccountStatus::Active,
            "2024-01-15",
            "2 hours ago",
            12456,
        )?,
        user(
            "2",
            "Sarah Johnson",
            "sarah@startup.com",
            Plan::Free,
            AccountStatus::Active,
            "2024-01-10",
            "1 day ago",
            892,
        )?,
        user(
            "3",
            "Mohammed Hassan",
            "mohammed@enterprise.co",
            Plan::Enterprise,
            AccountStatus::Suspended,
            "2024-01-05",
            "1 week ago",
            45678,
        )?,
        user(
            "4",
            "Lisa Chen",
            "lisa@devteam.io",
            Plan::Pro,
            AccountStatus::Pending,
            "2024-01-20",
            "Never",
            0,
        )?,
    ])
}

fn review_templates() -> Result<Vec<ReviewTemplate>> {
    let template = |id: &str,
                    name: &str,
                    channel: Channel,
                    message: &str,
                    variables: &[&str],
                    created_by: &str,
                    created_at: &str,
                    status: ReviewStatus,
                    (usage_count, report_count): (u64, u32)|
     -> Result<ReviewTemplate> {
        Ok(ReviewTemplate {
            id: id.to_string(),
            name: name.to_string(),
            channel,
            message: message.to_string(),
            variables: strings(variables),
            created_by: created_by.to_string(),
            created_at: date(created_at)?,
            status,
            usage_count,
            report_count,
        })
    };

    Ok(vec![
        template(
            "1",
            "Login Verification",
            Channel::Whatsapp,
            "Hi {{name}}, your login code is {{code}}. Valid for 5 minutes.",
            &["name", "code"],
            "Ahmed Al-Rashid",
            "2024-01-15",
            ReviewStatus::Pending,
            (0, 0),
        )?,
        template(
            "2",
            "Payment Confirmation",
            Channel::Email,
            "Dear {{name}}, your payment of {{amount}} has been processed. Reference: {{ref}}",
            &["name", "amount", "ref"],
            "Sarah Johnson",
            "2024-01-14",
            ReviewStatus::Approved,
            (1247, 2),
        )?,
        template(
            "3",
            "Account Recovery",
            Channel::Sms,
            "Your account recovery code: {{code}}. Do not share this code.",
            &["code"],
            "Mohammed Hassan",
            "2024-01-12",
            ReviewStatus::Rejected,
            (0, 5),
        )?,
        template(
            "4",
            "Welcome Message",
            Channel::Whatsapp,
            "Welcome to {{company}}! Your verification code is {{code}}.",
            &["company", "code"],
            "Lisa Chen",
            "2024-01-10",
            ReviewStatus::Pending,
            (0, 1),
        )?,
    ])
}

fn system_logs() -> Result<Vec<SystemLog>> {
    let log = |id: &str,
               at: &str,
               level: LogLevel,
               category: LogCategory,
               message: &str,
               user: Option<&str>,
               ip: Option<&str>,
               details: serde_json::Value|
     -> Result<SystemLog> {
        Ok(SystemLog {
            id: id.to_string(),
            timestamp: timestamp(at)?,
            level,
            category,
            message: message.to_string(),
            user: user.map(str::to_string),
            ip: ip.map(str::to_string),
            details,
        })
    };

    Ok(vec![
        log(
            "1",
            "2024-01-15 14:30:25",
            LogLevel::Security,
            LogCategory::Auth,
            "Failed login attempt detected",
            Some("unknown"),
            Some("192.168.1.100"),
            json!({ "attempts": 5, "email": "admin@example.com" }),
        )?,
        log(
            "2",
            "2024-01-15 14:28:15",
            LogLevel::Info,
            LogCategory::Api,
            "API key created successfully",
            Some("Ahmed Al-Rashid"),
            Some("10.0.0.1"),
            json!({ "keyId": "key_123456", "permissions": ["send", "templates"] }),
        )?,
        log(
            "3",
            "2024-01-15 14:25:42",
            LogLevel::Error,
            LogCategory::System,
            "Database connection timeout",
            None,
            None,
            json!({ "database": "primary", "timeout": "30s", "retries": 3 }),
        )?,
        log(
            "4",
            "2024-01-15 14:22:18",
            LogLevel::Warning,
            LogCategory::Billing,
            "User approaching plan limit",
            Some("Sarah Johnson"),
            None,
            json!({ "currentUsage": 48500, "planLimit": 50000, "percentage": 97 }),
        )?,
        log(
            "5",
            "2024-01-15 14:20:05",
            LogLevel::Info,
            LogCategory::Auth,
            "User logged in successfully",
            Some("Mohammed Hassan"),
            Some("172.16.0.1"),
            json!({ "sessionId": "sess_789012", "loginMethod": "password" }),
        )?,
    ])
}
