use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::leads::{ContactDetails, LeadTier, TrackingMeta};
use crate::workflows::notifications::NotificationAttempt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    LeadScored,
    QuoteIssued,
    SlotProposed,
    NoAvailability,
    BookingConfirmed,
    BookingConflict,
}

impl AuditKind {
    pub const fn label(self) -> &'static str {
        match self {
            AuditKind::LeadScored => "lead_scored",
            AuditKind::QuoteIssued => "quote_issued",
            AuditKind::SlotProposed => "slot_proposed",
            AuditKind::NoAvailability => "no_availability",
            AuditKind::BookingConfirmed => "booking_confirmed",
            AuditKind::BookingConflict => "booking_conflict",
        }
    }
}

/// One request outcome, written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub recorded_at: DateTime<Utc>,
    pub kind: AuditKind,
    pub contact: ContactDetails,
    #[serde(default)]
    pub tracking: Option<TrackingMeta>,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub tier: Option<LeadTier>,
    pub summary: String,
    #[serde(default)]
    pub notifications: Vec<NotificationAttempt>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl AuditRecord {
    pub fn new(
        recorded_at: DateTime<Utc>,
        kind: AuditKind,
        contact: &ContactDetails,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            recorded_at,
            kind,
            contact: contact.clone(),
            tracking: None,
            score: None,
            tier: None,
            summary: summary.into(),
            notifications: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_tracking(mut self, tracking: Option<TrackingMeta>) -> Self {
        self.tracking = tracking;
        self
    }

    pub fn with_score(mut self, score: u8, tier: LeadTier) -> Self {
        self.score = Some(score);
        self.tier = Some(tier);
        self
    }

    pub fn with_notifications(mut self, notifications: Vec<NotificationAttempt>) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Durable sink for request outcomes. A failed append fails the request.
pub trait AuditLog: Send + Sync {
    fn append(&self, record: AuditRecord) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit log io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("audit log csv failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("audit payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("audit log unavailable: {0}")]
    Unavailable(String),
}
