use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::leads::{ContactDetails, LeadProfile, ScoreResult, TrackingMeta};
use crate::workflows::notifications::NotificationAttempt;
use crate::workflows::quotes::{QuoteResult, ServiceSpec};
use crate::workflows::scheduling::{BookingConfirmation, CrewId, SlotProposal};

/// Inbound inquiry from the contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRequest {
    pub contact: ContactDetails,
    pub lead: LeadProfile,
    #[serde(default)]
    pub tracking: Option<TrackingMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadResponse {
    pub score: ScoreResult,
    pub notifications: Vec<NotificationAttempt>,
}

/// Pricing request. When `lead` is absent the lead is scored as an estimate request for
/// panel work at the contact's zip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub contact: ContactDetails,
    pub job: ServiceSpec,
    #[serde(default)]
    pub lead: Option<LeadProfile>,
    #[serde(default)]
    pub tracking: Option<TrackingMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote: QuoteResult,
    pub score: ScoreResult,
    pub notifications: Vec<NotificationAttempt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardLevel {
    None,
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Routine,
    Soon,
    Emergency,
}

/// Triage answers from the hazard checker; may stand in for an explicit job length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardAssessment {
    pub level: HazardLevel,
    pub urgency: Urgency,
    #[serde(default)]
    pub suggested_job_minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEstimateRequest {
    pub contact: ContactDetails,
    pub zip: String,
    pub service_type: String,
    #[serde(default)]
    pub job_length_minutes: Option<u32>,
    #[serde(default)]
    pub earliest_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub eligible_crews: Vec<CrewId>,
    #[serde(default)]
    pub hazard: Option<HazardAssessment>,
    #[serde(default)]
    pub tracking: Option<TrackingMeta>,
}

impl SlotEstimateRequest {
    /// Explicit length first, then the triage suggestion.
    pub fn resolved_job_minutes(&self) -> Option<u32> {
        self.job_length_minutes
            .or_else(|| self.hazard.and_then(|hazard| hazard.suggested_job_minutes))
    }

    pub fn is_emergency(&self) -> bool {
        self.hazard
            .is_some_and(|hazard| hazard.urgency == Urgency::Emergency)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotEstimateResponse {
    pub status: &'static str,
    pub proposal: SlotProposal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notifications: Vec<NotificationAttempt>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SlotConfirmRequest {
    pub contact: ContactDetails,
    pub proposal: SlotProposal,
    #[serde(default)]
    pub confirm: bool,
    #[serde(default)]
    pub tracking: Option<TrackingMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotConfirmResponse {
    pub status: &'static str,
    pub booking: BookingConfirmation,
    pub notifications: Vec<NotificationAttempt>,
}
