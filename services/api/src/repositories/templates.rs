//! Message template repository
//!
//! Templates are created and edited from the dashboard. Saving goes through a
//! [`TemplateRepository`]; [`LocalTemplates`] keeps them in memory.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use auth::validation::{ValidationErrors, validate_required};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use super::{StoreError, date, strings};
use crate::models::{
    Channel,
    template::{Template, TemplateStatus},
};

/// Longest message a template may carry, in characters
pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Template editor form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateForm {
    pub name: String,
    pub channel: String,
    pub message: String,
    /// `draft` (default) or `active`
    pub status: String,
    pub is_default: bool,
}

/// Validated template content, ready to be saved
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub channel: Channel,
    pub message: String,
    pub variables: Vec<String>,
    pub status: TemplateStatus,
    pub is_default: bool,
}

impl TemplateForm {
    /// Check every field, collecting all failures
    pub fn validate(self) -> Result<TemplateDraft, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(
            "name",
            validate_required(&self.name, "Template name is required"),
        );

        if self.message.chars().count() > MAX_MESSAGE_CHARS {
            errors.add(
                "message",
                format!("Message must be less than {} characters", MAX_MESSAGE_CHARS),
            );
        }
        errors.check(
            "message",
            validate_required(&self.message, "Message content is required"),
        );

        let channel = match self.channel.trim() {
            "" => Some(Channel::Whatsapp),
            value => value.parse::<Channel>().ok().or_else(|| {
                errors.add("channel", format!("Unknown channel: {}", value));
                None
            }),
        };

        let status = match self.status.trim() {
            "" => Some(TemplateStatus::Draft),
            value => value.parse::<TemplateStatus>().ok().or_else(|| {
                errors.add("status", format!("Unknown status: {}", value));
                None
            }),
        };

        match (channel, status) {
            (Some(channel), Some(status)) if errors.is_empty() => Ok(TemplateDraft {
                name: self.name.trim().to_string(),
                channel,
                variables: extract_variables(&self.message),
                message: self.message,
                status,
                is_default: self.is_default,
            }),
            _ => Err(errors),
        }
    }
}

/// `{{name}}` placeholders of `message`, first occurrence order, no repeats
pub fn extract_variables(message: &str) -> Vec<String> {
    static VARIABLE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = VARIABLE_REGEX
        .get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("Failed to compile variable regex"));

    let mut variables: Vec<String> = Vec::new();
    for captures in regex.captures_iter(message) {
        let name = &captures[1];
        if !variables.iter().any(|known| known == name) {
            variables.push(name.to_string());
        }
    }
    variables
}

/// Storage of the account's templates
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Template>, StoreError>;

    async fn create(&self, draft: &TemplateDraft) -> Result<Template, StoreError>;

    async fn update(&self, id: &str, draft: &TemplateDraft) -> Result<Template, StoreError>;
}

/// In-memory templates, seeded with the demo set
pub struct LocalTemplates {
    templates: RwLock<Vec<Template>>,
    latency: Duration,
}

impl LocalTemplates {
    pub fn new(templates: Vec<Template>, latency: Duration) -> Self {
        Self {
            templates: RwLock::new(templates),
            latency,
        }
    }

    pub fn seeded(latency: Duration) -> Result<Self> {
        Ok(Self::new(seed()?, latency))
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl TemplateRepository for LocalTemplates {
    async fn list(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.templates.read().await.clone())
    }

    async fn create(&self, draft: &TemplateDraft) -> Result<Template, StoreError> {
        self.simulate_latency().await;

        let mut templates = self.templates.write().await;
        let id = templates
            .iter()
            .filter_map(|template| template.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let template = Template {
            id: id.to_string(),
            name: draft.name.clone(),
            channel: draft.channel,
            message: draft.message.clone(),
            variables: draft.variables.clone(),
            is_default: draft.is_default,
            created_at: Utc::now().date_naive(),
            last_used: "Never".to_string(),
            usage_count: 0,
            status: draft.status,
        };

        info!(
            "Template {} created as {} ({})",
            template.id,
            template.status.as_ref(),
            template.name
        );
        templates.push(template.clone());
        Ok(template)
    }

    async fn update(&self, id: &str, draft: &TemplateDraft) -> Result<Template, StoreError> {
        self.simulate_latency().await;

        let mut templates = self.templates.write().await;
        let template = templates
            .iter_mut()
            .find(|template| template.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Template {}", id)))?;

        template.name = draft.name.clone();
        template.channel = draft.channel;
        template.message = draft.message.clone();
        template.variables = draft.variables.clone();
        template.is_default = draft.is_default;
        template.status = draft.status;

        info!("Template {} saved as {}", id, template.status.as_ref());
        Ok(template.clone())
    }
}

/// Templates shown by a fresh console
pub fn seed() -> Result<Vec<Template>> {
    Ok(vec![
        Template {
            id: "1".to_string(),
            name: "Login OTP".to_string(),
            channel: Channel::Whatsapp,
            message: "Hi {{name}}, your login code is {{code}}. Valid for 5 minutes.".to_string(),
            variables: strings(&["name", "code"]),
            is_default: true,
            created_at: date("2024-01-15")?,
            last_used: "2 hours ago".to_string(),
            usage_count: 1247,
            status: TemplateStatus::Active,
        },
        Template {
            id: "2".to_string(),
            name: "Registration Verification".to_string(),
            channel: Channel::Email,
            message: "Welcome {{name}}! Your verification code is {{code}}. Please enter this code to complete your registration.".to_string(),
            variables: strings(&["name", "code"]),
            is_default: false,
            created_at: date("2024-01-10")?,
            last_used: "1 day ago".to_string(),
            usage_count: 892,
            status: TemplateStatus::Active,
        },
        Template {
            id: "3".to_string(),
            name: "Password Reset".to_string(),
            channel: Channel::Sms,
            message: "Your password reset code is {{code}}. Do not share this code with anyone.".to_string(),
            variables: strings(&["code"]),
            is_default: false,
            created_at: date("2024-01-08")?,
            last_used: "3 days ago".to_string(),
            usage_count: 456,
            status: TemplateStatus::Active,
        },
        Template {
            id: "4".to_string(),
            name: "Payment Confirmation".to_string(),
            channel: Channel::Whatsapp,
            message: "Hi {{name}}, confirm your payment of {{amount}} with code {{code}}.".to_string(),
            variables: strings(&["name", "amount", "code"]),
            is_default: false,
            created_at: date("2024-01-05")?,
            last_used: "Never".to_string(),
            usage_count: 0,
            status: TemplateStatus::Draft,
        },
    ])
}
