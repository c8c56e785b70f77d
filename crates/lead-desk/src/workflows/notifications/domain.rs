use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::workflows::leads::{ContactDetails, LeadRoute, LeadTier};

/// Outbound channel destinations and time limits. Any missing destination disables the
/// matching channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub crm_webhook_url: Option<String>,
    pub sms_gateway_url: Option<String>,
    pub sms_api_key: Option<String>,
    pub sms_sender: Option<String>,
    pub staff_phone: Option<String>,
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_sender: Option<String>,
    pub channel_timeout: Duration,
    pub deadline: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            crm_webhook_url: None,
            sms_gateway_url: None,
            sms_api_key: None,
            sms_sender: None,
            staff_phone: None,
            email_api_url: None,
            email_api_key: None,
            email_sender: None,
            channel_timeout: Duration::from_secs(5),
            deadline: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    CrmWebhook,
    Sms,
    Email,
}

impl ChannelKind {
    pub const fn label(self) -> &'static str {
        match self {
            ChannelKind::CrmWebhook => "crm_webhook",
            ChannelKind::Sms => "sms",
            ChannelKind::Email => "email",
        }
    }

    /// Channels attempted for a route, CRM first.
    pub const fn for_route(route: LeadRoute) -> [ChannelKind; 2] {
        match route {
            LeadRoute::PhoneSms => [ChannelKind::CrmWebhook, ChannelKind::Sms],
            LeadRoute::EmailDrip => [ChannelKind::CrmWebhook, ChannelKind::Email],
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Sent,
    Failed,
    Skipped,
}

impl AttemptStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AttemptStatus::Sent => "sent",
            AttemptStatus::Failed => "failed",
            AttemptStatus::Skipped => "skipped",
        }
    }
}

/// Result of one channel for one request. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAttempt {
    pub channel: ChannelKind,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl NotificationAttempt {
    pub fn sent(channel: ChannelKind) -> Self {
        Self {
            channel,
            status: AttemptStatus::Sent,
            detail: None,
        }
    }

    pub fn failed(channel: ChannelKind, detail: impl Into<String>) -> Self {
        Self {
            channel,
            status: AttemptStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(channel: ChannelKind, detail: impl Into<String>) -> Self {
        Self {
            channel,
            status: AttemptStatus::Skipped,
            detail: Some(detail.into()),
        }
    }
}

/// What happened, as handed to the router by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub event: String,
    pub summary: String,
    pub details: serde_json::Value,
}

impl NotificationPayload {
    pub fn new(event: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            summary: summary.into(),
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

/// Fully addressed message shared by every channel of one fan-out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub event: String,
    pub tier: LeadTier,
    pub route: LeadRoute,
    pub contact: ContactDetails,
    pub summary: String,
    pub details: serde_json::Value,
}

impl NotificationMessage {
    pub fn new(
        route: LeadRoute,
        tier: LeadTier,
        contact: &ContactDetails,
        payload: NotificationPayload,
    ) -> Self {
        Self {
            event: payload.event,
            tier,
            route,
            contact: contact.clone(),
            summary: payload.summary,
            details: payload.details,
        }
    }

    /// Short plain-text rendering used for SMS and email bodies.
    pub fn headline(&self) -> String {
        format!(
            "Tier {} lead {} ({}): {}",
            self.tier.label(),
            self.contact.name,
            self.contact.reachable_at(),
            self.summary
        )
    }
}
