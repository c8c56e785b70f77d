use super::common::*;
use crate::workflows::audit::AuditKind;
use crate::workflows::intake::{
    IntakeError, LeadRequest, PersistenceError, SlotConfirmRequest, Urgency,
};
use crate::workflows::leads::{LeadIntent, LeadProfile, LeadRoute, LeadTier};
use crate::workflows::notifications::testing::Behavior;
use crate::workflows::notifications::{AttemptStatus, ChannelKind};
use crate::workflows::scheduling::{CalendarStore, CrewId, PlacementRejection};

fn panel_lead() -> LeadRequest {
    LeadRequest {
        contact: contact(),
        lead: LeadProfile {
            zip: None,
            intent: LeadIntent::Book,
            service_category: "Panel upgrade".to_string(),
            budget_range: String::new(),
            notes: String::new(),
        },
        tracking: tracking(),
    }
}

#[tokio::test]
async fn lead_is_scored_routed_and_audited() {
    let (harness, audit) = harness(Behavior::Send);

    let response = harness
        .service
        .submit_lead(panel_lead())
        .await
        .expect("lead accepted");

    assert_eq!(response.score.score, 94);
    assert_eq!(response.score.tier, LeadTier::A);
    assert_eq!(response.score.route, LeadRoute::PhoneSms);
    let channels: Vec<_> = response
        .notifications
        .iter()
        .map(|attempt| (attempt.channel, attempt.status))
        .collect();
    assert_eq!(
        channels,
        vec![
            (ChannelKind::CrmWebhook, AttemptStatus::Sent),
            (ChannelKind::Sms, AttemptStatus::Sent),
        ]
    );
    assert!(harness.email.received().is_empty());
    assert_eq!(harness.crm.received()[0].event, "lead_scored");

    let records = audit.of_kind(AuditKind::LeadScored);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].score, Some(94));
    assert_eq!(records[0].tier, Some(LeadTier::A));
    assert_eq!(records[0].recorded_at, monday_morning());
    assert_eq!(records[0].tracking, tracking());
    assert_eq!(records[0].notifications, response.notifications);
}

#[tokio::test]
async fn quote_survives_a_dead_sms_gateway() {
    let (harness, audit) = harness(Behavior::Fail("connection refused"));

    let response = harness
        .service
        .price_quote(quote_request())
        .await
        .expect("quote succeeds despite sms failure");

    assert_eq!(response.quote.base_price_cents, 440_625);
    assert_eq!(response.quote.bands[0].min, 4055);
    assert_eq!(response.quote.bands[2].max, 5815);
    assert_eq!(response.score.score, 86);
    assert_eq!(response.score.route, LeadRoute::PhoneSms);
    assert_eq!(response.notifications[0].status, AttemptStatus::Sent);
    assert_eq!(response.notifications[1].channel, ChannelKind::Sms);
    assert_eq!(response.notifications[1].status, AttemptStatus::Failed);

    let records = audit.of_kind(AuditKind::QuoteIssued);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].summary, "200A service quote $4055 to $5815");
    assert_eq!(records[0].notifications[1].status, AttemptStatus::Failed);
}

#[tokio::test]
async fn invalid_quote_is_rejected_before_any_side_effect() {
    let (harness, audit) = harness(Behavior::Send);
    let mut request = quote_request();
    request.job.amps = 175;
    request.contact.name = String::new();

    let err = harness
        .service
        .price_quote(request)
        .await
        .expect_err("validation fails");

    match err {
        IntakeError::Validation(errors) => {
            assert!(errors.has_field("amps"));
            assert!(errors.has_field("contact.name"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(harness.crm.received().is_empty());
    assert!(audit.records().is_empty());
}

#[tokio::test]
async fn hazard_suggestion_fills_in_the_job_length() {
    let (harness, audit) = harness(Behavior::Send);
    let mut request = estimate_request(None);
    request.hazard = Some(hazard(Urgency::Soon, Some(120)));

    let response = harness
        .service
        .estimate_slot(request)
        .await
        .expect("slot proposed");

    let proposal = response.proposal;
    assert_eq!(proposal.crew_id, CrewId("north".to_string()));
    assert_eq!(proposal.job_length_minutes, 120);
    assert_eq!(proposal.start, monday_morning() + chrono::Duration::minutes(105));
    assert_eq!(proposal.end, proposal.start + chrono::Duration::minutes(135));
    assert!(response.notifications.is_empty());
    assert!(harness.crm.received().is_empty());
    assert_eq!(audit.of_kind(AuditKind::SlotProposed).len(), 1);
}

#[tokio::test]
async fn estimate_needs_some_job_length() {
    let (harness, _) = harness(Behavior::Send);

    let err = harness
        .service
        .estimate_slot(estimate_request(None))
        .await
        .expect_err("length missing");

    assert!(matches!(
        err,
        IntakeError::Validation(ref errors) if errors.has_field("job_length_minutes")
    ));
}

#[tokio::test]
async fn emergency_estimate_pages_staff() {
    let (harness, audit) = harness(Behavior::Send);
    let mut request = estimate_request(None);
    request.hazard = Some(hazard(Urgency::Emergency, Some(90)));

    let response = harness
        .service
        .estimate_slot(request)
        .await
        .expect("slot proposed");

    assert_eq!(response.notifications.len(), 2);
    assert_eq!(response.notifications[1].channel, ChannelKind::Sms);
    let crm = harness.crm.received();
    assert_eq!(crm[0].event, "emergency_estimate");
    assert!(crm[0].summary.starts_with("EMERGENCY: panel upgrade with North Crew"));

    let records = audit.of_kind(AuditKind::SlotProposed);
    assert_eq!(records[0].payload["emergency"], serde_json::json!(true));
}

#[tokio::test]
async fn full_calendars_report_no_availability() {
    let (harness, audit) = harness(Behavior::Send);
    book_everyone_solid(&harness.store);

    let err = harness
        .service
        .estimate_slot(estimate_request(Some(60)))
        .await
        .expect_err("nothing open");

    assert!(matches!(err, IntakeError::NoAvailability { horizon_days: 14 }));
    assert_eq!(audit.of_kind(AuditKind::NoAvailability).len(), 1);
}

#[tokio::test]
async fn confirm_requires_an_explicit_flag() {
    let (harness, _) = harness(Behavior::Send);
    let proposal = harness
        .service
        .estimate_slot(estimate_request(Some(60)))
        .await
        .expect("slot proposed")
        .proposal;

    let err = harness
        .service
        .confirm_slot(SlotConfirmRequest {
            contact: contact(),
            proposal,
            confirm: false,
            tracking: None,
        })
        .await
        .expect_err("unconfirmed");

    assert!(matches!(err, IntakeError::Validation(ref errors) if errors.has_field("confirm")));
    let booked = harness
        .store
        .appointments(
            &CrewId("north".to_string()),
            monday_morning(),
            monday_morning() + chrono::Duration::days(1),
        )
        .expect("store readable");
    assert!(booked.is_empty());
}

#[tokio::test]
async fn second_confirm_of_one_proposal_gets_an_alternative() {
    let (harness, audit) = harness(Behavior::Send);
    let proposal = harness
        .service
        .estimate_slot(estimate_request(Some(90)))
        .await
        .expect("slot proposed")
        .proposal;
    let confirm = SlotConfirmRequest {
        contact: contact(),
        proposal,
        confirm: true,
        tracking: tracking(),
    };

    let booked = harness
        .service
        .confirm_slot(confirm.clone())
        .await
        .expect("first confirm wins");
    assert_eq!(booked.status, "confirmed");
    assert_eq!(booked.booking.crew_name, "North Crew");
    assert!(booked.booking.booking_id.0.starts_with("bk-"));
    assert_eq!(booked.notifications[0].channel, ChannelKind::CrmWebhook);

    match harness.service.confirm_slot(confirm).await {
        Err(IntakeError::Conflict {
            reason,
            alternative,
        }) => {
            assert!(matches!(reason, PlacementRejection::Overlap(_)));
            let alternative = alternative.expect("alternative offered");
            assert!(
                alternative.crew_id != booked.booking.crew_id
                    || alternative.start >= booked.booking.end
            );
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    assert_eq!(audit.of_kind(AuditKind::BookingConfirmed).len(), 1);
    assert_eq!(audit.of_kind(AuditKind::BookingConflict).len(), 1);
}

#[tokio::test]
async fn audit_failure_fails_the_request() {
    let harness = broken_audit_harness();

    let err = harness
        .service
        .submit_lead(panel_lead())
        .await
        .expect_err("audit write fails");

    assert!(matches!(
        err,
        IntakeError::Persistence(PersistenceError::Audit(_))
    ));
    assert_eq!(harness.crm.received().len(), 1);
    assert_eq!(harness.sms.received().len(), 1);
}
