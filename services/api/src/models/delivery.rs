//! Delivery log models

use chrono::NaiveDateTime;
use common::filter::Record;
use serde::Serialize;
use strum::AsRefStr;

use super::Channel;

/// Facet names of the delivery log listing
pub mod facets {
    pub const STATUS: &str = "status";
    pub const CHANNEL: &str = "channel";
    pub const TEMPLATE: &str = "template";
    pub const USER: &str = "user";
}

/// Range selector names of the delivery log listing
pub mod measures {
    pub const DELIVERY_TIME: &str = "delivery_time";
    pub const COST: &str = "cost";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    Pending,
}

/// One OTP delivery attempt
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryLog {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub to: String,
    pub channel: Channel,
    pub template: String,
    /// `template` lowercased with whitespace runs replaced by `_`
    pub template_slug: String,
    pub status: DeliveryStatus,
    /// Seconds until delivery; absent while pending or after a failure
    pub delivery_time_secs: Option<f64>,
    /// Cost in US dollars
    pub cost: f64,
    pub user_id: String,
    pub user_agent: String,
    pub ip_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Slug used by the template facet, e.g. `Login OTP` becomes `login_otp`
pub fn template_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

impl Record for DeliveryLog {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.to.as_str(), self.template.as_str()]
    }

    fn facet_values(&self, facet: &str) -> Vec<&str> {
        match facet {
            facets::STATUS => vec![self.status.as_ref()],
            facets::CHANNEL => vec![self.channel.as_ref()],
            facets::TEMPLATE => vec![self.template_slug.as_str()],
            facets::USER => vec![self.user_id.as_str()],
            _ => Vec::new(),
        }
    }

    fn timestamp(&self) -> Option<NaiveDateTime> {
        Some(self.timestamp)
    }

    fn measure(&self, selector: &str) -> Option<f64> {
        match selector {
            measures::DELIVERY_TIME => self.delivery_time_secs,
            measures::COST => Some(self.cost),
            _ => None,
        }
    }
}

/// Delivery figures shown on the dashboard home
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliverySummary {
    pub total: usize,
    pub delivered: usize,
    pub failed: usize,
    pub pending: usize,
    /// Delivered share of all attempts, in percent
    pub success_rate: f64,
    pub average_delivery_secs: Option<f64>,
}

impl DeliverySummary {
    pub fn from_logs(logs: &[DeliveryLog]) -> Self {
        let count = |status: DeliveryStatus| logs.iter().filter(|log| log.status == status).count();
        let delivered = count(DeliveryStatus::Delivered);

        let times: Vec<f64> = logs.iter().filter_map(|log| log.delivery_time_secs).collect();
        let average_delivery_secs = (!times.is_empty())
            .then(|| round_tenths(times.iter().sum::<f64>() / times.len() as f64));

        let success_rate = if logs.is_empty() {
            0.0
        } else {
            round_tenths(delivered as f64 * 100.0 / logs.len() as f64)
        };

        Self {
            total: logs.len(),
            delivered,
            failed: count(DeliveryStatus::Failed),
            pending: count(DeliveryStatus::Pending),
            success_rate,
            average_delivery_secs,
        }
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
