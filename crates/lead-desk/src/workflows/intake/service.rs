use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::domain::{
    LeadRequest, LeadResponse, QuoteRequest, QuoteResponse, SlotConfirmRequest,
    SlotConfirmResponse, SlotEstimateRequest, SlotEstimateResponse,
};
use crate::workflows::audit::{AuditError, AuditKind, AuditLog, AuditRecord};
use crate::workflows::leads::{
    ContactDetails, LeadIntent, LeadProfile, LeadRoute, LeadScoringEngine, ScoreResult,
};
use crate::workflows::notifications::{
    NotificationAttempt, NotificationPayload, NotificationRouter,
};
use crate::workflows::quotes::{QuotePricingEngine, ServiceSpec};
use crate::workflows::scheduling::{
    CalendarError, CalendarStore, PlacementRejection, Scheduler, SchedulingError, SlotProposal,
    SlotRequest,
};
use crate::workflows::ValidationErrors;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Request orchestration: validate, run the engines, fan out notifications, then write
/// the audit record. Only a failed audit or calendar write fails a request.
pub struct LeadDeskService<C, A> {
    scoring: LeadScoringEngine,
    pricing: QuotePricingEngine,
    scheduler: Scheduler<C>,
    notifier: NotificationRouter,
    audit: Arc<A>,
    clock: Clock,
}

impl<C, A> LeadDeskService<C, A>
where
    C: CalendarStore + 'static,
    A: AuditLog + 'static,
{
    pub fn new(scheduler: Scheduler<C>, notifier: NotificationRouter, audit: Arc<A>) -> Self {
        Self {
            scoring: LeadScoringEngine::standard(),
            pricing: QuotePricingEngine::standard(),
            scheduler,
            notifier,
            audit,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_engines(
        mut self,
        scoring: LeadScoringEngine,
        pricing: QuotePricingEngine,
    ) -> Self {
        self.scoring = scoring;
        self.pricing = pricing;
        self
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    pub fn scheduler(&self) -> &Scheduler<C> {
        &self.scheduler
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Score and route a contact-form lead.
    pub async fn submit_lead(&self, request: LeadRequest) -> Result<LeadResponse, IntakeError> {
        let LeadRequest {
            contact,
            lead,
            tracking,
        } = request;
        contact.validate()?;

        let profile = with_contact_zip(lead, &contact);
        let score = self.scoring.score(&profile);
        let summary = format!(
            "{} inquiry for '{}' scored {}",
            profile.intent.label(),
            profile.service_category,
            score.score
        );

        let payload = NotificationPayload::new(AuditKind::LeadScored.label(), summary.clone())
            .with_details(json!({
                "score": score.score,
                "tier": score.tier,
                "route": score.route,
                "lead": profile,
                "tracking": tracking,
            }));
        let notifications = self.notify(&score, &contact, payload).await;

        self.record(
            AuditRecord::new(self.now(), AuditKind::LeadScored, &contact, summary)
                .with_tracking(tracking)
                .with_score(score.score, score.tier)
                .with_notifications(notifications.clone())
                .with_payload(json!({ "lead": profile, "breakdown": score.breakdown })),
        )?;

        Ok(LeadResponse {
            score,
            notifications,
        })
    }

    /// Price a job, score the lead behind it, and route the quote.
    pub async fn price_quote(&self, request: QuoteRequest) -> Result<QuoteResponse, IntakeError> {
        let QuoteRequest {
            contact,
            job,
            lead,
            tracking,
        } = request;

        let mut errors = ValidationErrors::new();
        if let Err(contact_errors) = contact.validate() {
            errors.extend(contact_errors);
        }
        if let Err(job_errors) = self.pricing.validate(&job) {
            errors.extend(job_errors);
        }
        errors.into_result()?;

        let quote = self.pricing.quote(&job)?;
        let profile = match lead {
            Some(lead) => with_contact_zip(lead, &contact),
            None => estimate_profile(&job, &contact),
        };
        let score = self.scoring.score(&profile);

        let range = match (quote.bands.first(), quote.bands.last()) {
            (Some(low), Some(high)) => format!("${} to ${}", low.min, high.max),
            _ => "unpriced".to_string(),
        };
        let summary = format!("{}A service quote {range}", job.amps);

        let payload = NotificationPayload::new(AuditKind::QuoteIssued.label(), summary.clone())
            .with_details(json!({
                "score": score.score,
                "tier": score.tier,
                "job": job,
                "bands": quote.bands,
                "recommended_cta": quote.recommended_cta,
                "tracking": tracking,
            }));
        let notifications = self.notify(&score, &contact, payload).await;

        self.record(
            AuditRecord::new(self.now(), AuditKind::QuoteIssued, &contact, summary)
                .with_tracking(tracking)
                .with_score(score.score, score.tier)
                .with_notifications(notifications.clone())
                .with_payload(json!({
                    "job": job,
                    "base_price_cents": quote.base_price_cents,
                    "bands": quote.bands,
                })),
        )?;

        Ok(QuoteResponse {
            quote,
            score,
            notifications,
        })
    }

    /// Earliest opening for the job. Emergencies also go out on the phone route whatever
    /// the lead's tier.
    pub async fn estimate_slot(
        &self,
        request: SlotEstimateRequest,
    ) -> Result<SlotEstimateResponse, IntakeError> {
        let mut errors = ValidationErrors::new();
        if let Err(contact_errors) = request.contact.validate() {
            errors.extend(contact_errors);
        }
        let job_length_minutes = match request.resolved_job_minutes() {
            Some(minutes) => minutes,
            None => {
                errors.push(
                    "job_length_minutes",
                    "is required unless the hazard assessment suggests a length",
                );
                0
            }
        };
        errors.into_result()?;

        let emergency = request.is_emergency();
        let slot_request = SlotRequest {
            zip: request.zip.clone(),
            service_type: request.service_type.clone(),
            job_length_minutes,
            earliest_start: request.earliest_start,
            eligible_crews: request.eligible_crews.clone(),
        };
        let now = self.now();

        match self.scheduler.propose_earliest_slot(&slot_request, now) {
            Ok(proposal) => {
                let summary = format!(
                    "{} with {} at {}",
                    request.service_type.trim(),
                    proposal.crew_name,
                    proposal.start.to_rfc3339()
                );
                let notifications = if emergency {
                    self.alert_emergency(&request, &summary, Some(&proposal)).await
                } else {
                    Vec::new()
                };
                self.record(
                    AuditRecord::new(now, AuditKind::SlotProposed, &request.contact, summary)
                        .with_tracking(request.tracking.clone())
                        .with_notifications(notifications.clone())
                        .with_payload(json!({
                            "proposal": proposal,
                            "hazard": request.hazard,
                            "emergency": emergency,
                        })),
                )?;
                Ok(SlotEstimateResponse {
                    status: "proposed",
                    proposal,
                    notifications,
                })
            }
            Err(SchedulingError::NoAvailability { horizon_days }) => {
                let summary = format!(
                    "no opening for {} in {} within {horizon_days} days",
                    request.service_type.trim(),
                    request.zip.trim()
                );
                let notifications = if emergency {
                    self.alert_emergency(&request, &summary, None).await
                } else {
                    Vec::new()
                };
                self.record(
                    AuditRecord::new(now, AuditKind::NoAvailability, &request.contact, summary)
                        .with_tracking(request.tracking.clone())
                        .with_notifications(notifications)
                        .with_payload(json!({
                            "request": slot_request,
                            "hazard": request.hazard,
                            "emergency": emergency,
                        })),
                )?;
                Err(IntakeError::NoAvailability { horizon_days })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Book a previously proposed slot. Loses cleanly to a concurrent booking.
    pub async fn confirm_slot(
        &self,
        request: SlotConfirmRequest,
    ) -> Result<SlotConfirmResponse, IntakeError> {
        let SlotConfirmRequest {
            contact,
            proposal,
            confirm,
            tracking,
        } = request;

        let mut errors = ValidationErrors::new();
        if let Err(contact_errors) = contact.validate() {
            errors.extend(contact_errors);
        }
        if !confirm {
            errors.push("confirm", "must be true to book the slot");
        }
        errors.into_result()?;

        let now = self.now();
        match self.scheduler.confirm_slot(&proposal, &contact.name, now) {
            Ok(booking) => {
                let profile = LeadProfile {
                    zip: Some(proposal.zip.clone()),
                    intent: LeadIntent::Book,
                    service_category: proposal.service_type.clone(),
                    budget_range: String::new(),
                    notes: String::new(),
                };
                let score = self.scoring.score(&profile);
                let summary = format!(
                    "booking {} with {} at {}",
                    booking.booking_id,
                    booking.crew_name,
                    booking.start.to_rfc3339()
                );
                let payload =
                    NotificationPayload::new(AuditKind::BookingConfirmed.label(), summary.clone())
                        .with_details(json!({
                            "booking": booking,
                            "zip": proposal.zip,
                            "service_type": proposal.service_type,
                            "tracking": tracking,
                        }));
                let notifications = self.notify(&score, &contact, payload).await;

                self.record(
                    AuditRecord::new(now, AuditKind::BookingConfirmed, &contact, summary)
                        .with_tracking(tracking)
                        .with_score(score.score, score.tier)
                        .with_notifications(notifications.clone())
                        .with_payload(json!({ "booking": booking, "proposal": proposal })),
                )?;

                Ok(SlotConfirmResponse {
                    status: "confirmed",
                    booking,
                    notifications,
                })
            }
            Err(SchedulingError::Conflict {
                reason,
                alternative,
            }) => {
                let summary = format!(
                    "requested slot with {} rejected: {reason}",
                    proposal.crew_name
                );
                self.record(
                    AuditRecord::new(now, AuditKind::BookingConflict, &contact, summary)
                        .with_tracking(tracking)
                        .with_payload(json!({
                            "proposal": proposal,
                            "reason": reason.to_string(),
                            "alternative": alternative,
                        })),
                )?;
                Err(IntakeError::Conflict {
                    reason,
                    alternative,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    async fn notify(
        &self,
        score: &ScoreResult,
        contact: &ContactDetails,
        payload: NotificationPayload,
    ) -> Vec<NotificationAttempt> {
        self.notifier
            .notify(score.route, score.tier, contact, payload)
            .await
    }

    async fn alert_emergency(
        &self,
        request: &SlotEstimateRequest,
        summary: &str,
        proposal: Option<&SlotProposal>,
    ) -> Vec<NotificationAttempt> {
        let profile = LeadProfile {
            zip: Some(request.zip.clone()),
            intent: LeadIntent::Book,
            service_category: request.service_type.clone(),
            budget_range: String::new(),
            notes: "emergency".to_string(),
        };
        let score = self.scoring.score(&profile);
        tracing::info!(zip = %request.zip, "emergency estimate, alerting staff");

        let headline = format!("EMERGENCY: {summary}");
        let payload = NotificationPayload::new("emergency_estimate", headline).with_details(json!({
            "hazard": request.hazard,
            "proposal": proposal,
            "tracking": request.tracking,
        }));
        self.notifier
            .notify(LeadRoute::PhoneSms, score.tier, &request.contact, payload)
            .await
    }

    fn record(&self, record: AuditRecord) -> Result<(), IntakeError> {
        let kind = record.kind;
        self.audit.append(record).map_err(|error| {
            tracing::error!(kind = kind.label(), %error, "audit write failed");
            IntakeError::Persistence(PersistenceError::Audit(error))
        })
    }
}

/// Falls back to the contact's zip when the lead form left it blank.
fn with_contact_zip(mut lead: LeadProfile, contact: &ContactDetails) -> LeadProfile {
    let blank = lead.zip.as_deref().map_or(true, |zip| zip.trim().is_empty());
    if blank {
        lead.zip = contact.zip.clone();
    }
    lead
}

fn estimate_profile(job: &ServiceSpec, contact: &ContactDetails) -> LeadProfile {
    let mut notes: Vec<&str> = job.add_ons.iter().map(String::as_str).collect();
    notes.sort_unstable();
    LeadProfile {
        zip: contact.zip.clone(),
        intent: LeadIntent::Estimate,
        service_category: format!("{}A panel service", job.amps),
        budget_range: String::new(),
        notes: notes.join(" ").replace('_', " "),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("audit write failed: {0}")]
    Audit(#[from] AuditError),
    #[error("calendar write failed: {0}")]
    Calendar(#[from] CalendarError),
}

/// Request outcomes the HTTP layer maps to status codes.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("no feasible slot within {horizon_days} days")]
    NoAvailability { horizon_days: u32 },
    #[error("slot no longer available: {reason}")]
    Conflict {
        reason: PlacementRejection,
        alternative: Option<Box<SlotProposal>>,
    },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<SchedulingError> for IntakeError {
    fn from(value: SchedulingError) -> Self {
        match value {
            SchedulingError::Validation(errors) => Self::Validation(errors),
            SchedulingError::NoAvailability { horizon_days } => {
                Self::NoAvailability { horizon_days }
            }
            SchedulingError::Conflict {
                reason,
                alternative,
            } => Self::Conflict {
                reason,
                alternative,
            },
            SchedulingError::UnknownCrew(crew) => Self::Validation(ValidationErrors::single(
                "crew_id",
                format!("unknown crew {crew}"),
            )),
            SchedulingError::Store(error) => {
                tracing::error!(%error, "calendar store failed");
                Self::Persistence(PersistenceError::Calendar(error))
            }
        }
    }
}
