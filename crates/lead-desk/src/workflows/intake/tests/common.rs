use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::audit::{AuditError, AuditLog, AuditRecord, InMemoryAuditLog};
use crate::workflows::intake::{
    HazardAssessment, HazardLevel, LeadDeskService, QuoteRequest, SlotEstimateRequest, Urgency,
};
use crate::workflows::leads::{ContactDetails, TrackingMeta};
use crate::workflows::notifications::testing::{Behavior, FakeChannel};
use crate::workflows::notifications::{ChannelKind, NotificationRouter};
use crate::workflows::quotes::ServiceSpec;
use crate::workflows::scheduling::{
    Crew, CrewId, InMemoryCalendar, NewAppointment, Scheduler, SchedulingPolicy, TravelEstimate,
    TravelTimeProvider,
};

pub(super) struct FlatTravel;

impl TravelTimeProvider for FlatTravel {
    fn estimate(&self, _origin_zip: &str, _destination_zip: &str) -> TravelEstimate {
        TravelEstimate {
            minutes: 20,
            miles: 8.0,
        }
    }
}

/// Audit sink whose storage is gone.
pub(super) struct BrokenAuditLog;

impl AuditLog for BrokenAuditLog {
    fn append(&self, _record: AuditRecord) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("disk full".to_string()))
    }
}

/// Monday 2026-03-02 07:00 UTC.
pub(super) fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 7, 0, 0).unwrap()
}

pub(super) fn crews() -> Vec<Crew> {
    vec![
        Crew {
            id: CrewId("north".to_string()),
            name: "North Crew".to_string(),
            home_zip: "78731".to_string(),
            services: Vec::new(),
        },
        Crew {
            id: CrewId("south".to_string()),
            name: "South Crew".to_string(),
            home_zip: "78745".to_string(),
            services: vec!["panel upgrade".to_string(), "ev charger".to_string()],
        },
    ]
}

pub(super) struct Harness<A> {
    pub(super) service: Arc<LeadDeskService<InMemoryCalendar, A>>,
    pub(super) store: Arc<InMemoryCalendar>,
    pub(super) crm: Arc<FakeChannel>,
    pub(super) sms: Arc<FakeChannel>,
    pub(super) email: Arc<FakeChannel>,
}

fn build<A: AuditLog + 'static>(audit: Arc<A>, sms: Behavior) -> Harness<A> {
    let store = Arc::new(InMemoryCalendar::new(crews()));
    let scheduler = Scheduler::new(
        store.clone(),
        Arc::new(FlatTravel),
        SchedulingPolicy::default(),
    );
    let crm = FakeChannel::new(ChannelKind::CrmWebhook, Behavior::Send);
    let sms = FakeChannel::new(ChannelKind::Sms, sms);
    let email = FakeChannel::new(ChannelKind::Email, Behavior::Send);
    let notifier = NotificationRouter::new(Duration::from_secs(1), Duration::from_secs(2))
        .with_channel(crm.clone())
        .with_channel(sms.clone())
        .with_channel(email.clone());

    let service =
        Arc::new(LeadDeskService::new(scheduler, notifier, audit).with_clock(monday_morning));

    Harness {
        service,
        store,
        crm,
        sms,
        email,
    }
}

pub(super) fn harness(sms: Behavior) -> (Harness<InMemoryAuditLog>, InMemoryAuditLog) {
    let audit = InMemoryAuditLog::new();
    (build(Arc::new(audit.clone()), sms), audit)
}

pub(super) fn broken_audit_harness() -> Harness<BrokenAuditLog> {
    build(Arc::new(BrokenAuditLog), Behavior::Send)
}

pub(super) fn contact() -> ContactDetails {
    ContactDetails {
        name: "Jordan Castillo".to_string(),
        phone: Some("+15125550199".to_string()),
        email: Some("jordan@example.com".to_string()),
        zip: Some("78717".to_string()),
    }
}

pub(super) fn tracking() -> Option<TrackingMeta> {
    Some(TrackingMeta {
        source: Some("google".to_string()),
        campaign: Some("spring-panels".to_string()),
        landing_page: Some("/panel-upgrades".to_string()),
    })
}

/// 200A, 35 ft run, 40 spaces, EV-ready circuit.
pub(super) fn quote_request() -> QuoteRequest {
    QuoteRequest {
        contact: contact(),
        job: ServiceSpec {
            amps: 200,
            run_length_feet: 35,
            panel_spaces_needed: 40,
            add_ons: BTreeSet::from(["ev_ready".to_string()]),
        },
        lead: None,
        tracking: tracking(),
    }
}

pub(super) fn estimate_request(job_length_minutes: Option<u32>) -> SlotEstimateRequest {
    SlotEstimateRequest {
        contact: contact(),
        zip: "78704".to_string(),
        service_type: "panel upgrade".to_string(),
        job_length_minutes,
        earliest_start: None,
        eligible_crews: Vec::new(),
        hazard: None,
        tracking: tracking(),
    }
}

pub(super) fn hazard(urgency: Urgency, suggested_job_minutes: Option<u32>) -> HazardAssessment {
    HazardAssessment {
        level: HazardLevel::High,
        urgency,
        suggested_job_minutes,
    }
}

/// Fill the whole horizon for every crew.
pub(super) fn book_everyone_solid(store: &InMemoryCalendar) {
    for crew in crews() {
        for day in 0..15 {
            let start = monday_morning() + chrono::Duration::days(day) + chrono::Duration::hours(1);
            store
                .seed(NewAppointment {
                    crew_id: crew.id.clone(),
                    zip: "78701".to_string(),
                    service_type: "seeded".to_string(),
                    customer_name: "Existing customer".to_string(),
                    start,
                    end: start + chrono::Duration::hours(9),
                    job_length_minutes: 525,
                    buffer_before_minutes: 15,
                    buffer_after_minutes: 15,
                    travel_minutes_from_prev: 0,
                    travel_minutes_to_next: 0,
                })
                .expect("seed succeeds");
        }
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
