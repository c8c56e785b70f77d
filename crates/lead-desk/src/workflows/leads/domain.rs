use serde::{Deserialize, Serialize};

use crate::workflows::validation::{is_plausible_email, is_well_formed_zip};
use crate::workflows::ValidationErrors;

/// What the visitor asked for. Ordered from strongest to weakest buying signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadIntent {
    Book,
    Estimate,
    Contact,
}

impl LeadIntent {
    pub const fn label(self) -> &'static str {
        match self {
            LeadIntent::Book => "book",
            LeadIntent::Estimate => "estimate",
            LeadIntent::Contact => "contact",
        }
    }
}

/// Immutable scoring input assembled per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadProfile {
    #[serde(default)]
    pub zip: Option<String>,
    pub intent: LeadIntent,
    #[serde(default)]
    pub service_category: String,
    #[serde(default)]
    pub budget_range: String,
    #[serde(default)]
    pub notes: String,
}

/// How to reach the person behind a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

impl ContactDetails {
    /// A name plus at least one way to reach the person.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.push("contact.name", "is required");
        }
        let has_phone = self.phone.as_deref().is_some_and(|phone| !phone.trim().is_empty());
        let has_email = self.email.as_deref().is_some_and(|email| !email.trim().is_empty());
        if !has_phone && !has_email {
            errors.push("contact.phone", "a phone number or email address is required");
        }
        if let Some(email) = self.email.as_deref().filter(|email| !email.trim().is_empty()) {
            if !is_plausible_email(email) {
                errors.push("contact.email", "must be an email address");
            }
        }
        if let Some(zip) = self.zip.as_deref() {
            if !is_well_formed_zip(zip) {
                errors.push("contact.zip", "must be a 5-digit postal code");
            }
        }
        errors.into_result()
    }

    /// Best single handle for log lines and message bodies.
    pub fn reachable_at(&self) -> &str {
        self.phone
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("no contact handle")
    }
}

/// Marketing attribution captured by the landing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingMeta {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub landing_page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadTier {
    A,
    B,
}

impl LeadTier {
    pub const fn label(self) -> &'static str {
        match self {
            LeadTier::A => "A",
            LeadTier::B => "B",
        }
    }

    pub const fn route(self) -> LeadRoute {
        match self {
            LeadTier::A => LeadRoute::PhoneSms,
            LeadTier::B => LeadRoute::EmailDrip,
        }
    }
}

/// Notification strategy selected from the tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadRoute {
    PhoneSms,
    EmailDrip,
}

impl LeadRoute {
    pub const fn label(self) -> &'static str {
        match self {
            LeadRoute::PhoneSms => "phone_sms",
            LeadRoute::EmailDrip => "email_drip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Base,
    ZipIncome,
    Intent,
    JobSize,
}

/// Discrete contribution to a lead score, kept for audits and CRM notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub tier: LeadTier,
    pub route: LeadRoute,
    pub breakdown: Vec<ScoreComponent>,
}

impl ScoreResult {
    pub fn points_for(&self, factor: ScoreFactor) -> Option<u8> {
        self.breakdown
            .iter()
            .find(|component| component.factor == factor)
            .map(|component| component.points)
    }
}
