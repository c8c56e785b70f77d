//! End-to-end booking through the public service facade with real travel estimates and a
//! CSV audit trail.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, TimeZone, Utc};

use lead_desk::workflows::audit::CsvAuditLog;
use lead_desk::workflows::intake::{
    IntakeError, LeadDeskService, SlotConfirmRequest, SlotEstimateRequest,
};
use lead_desk::workflows::leads::ContactDetails;
use lead_desk::workflows::notifications::NotificationRouter;
use lead_desk::workflows::scheduling::{
    Crew, CrewId, InMemoryCalendar, Scheduler, SchedulingError, SchedulingPolicy, SlotRequest,
    ZipCentroidTravel,
};

/// Tuesday 2026-04-07 06:30 UTC.
fn tuesday_early() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 7, 6, 30, 0).unwrap()
}

fn crews() -> Vec<Crew> {
    vec![
        Crew {
            id: CrewId("east".to_string()),
            name: "East Crew".to_string(),
            home_zip: "78701".to_string(),
            services: vec!["panel upgrade".to_string()],
        },
        Crew {
            id: CrewId("west".to_string()),
            name: "West Crew".to_string(),
            home_zip: "78746".to_string(),
            services: vec!["generator".to_string()],
        },
    ]
}

fn scheduler(store: Arc<InMemoryCalendar>) -> Scheduler<InMemoryCalendar> {
    Scheduler::new(
        store,
        Arc::new(ZipCentroidTravel::standard()),
        SchedulingPolicy::default(),
    )
}

fn customer(name: &str) -> ContactDetails {
    ContactDetails {
        name: name.to_string(),
        phone: Some("+15125550111".to_string()),
        email: None,
        zip: Some("78704".to_string()),
    }
}

#[test]
fn proposals_are_stable_until_something_commits() {
    let store = Arc::new(InMemoryCalendar::new(crews()));
    let scheduler = scheduler(store);
    let request = SlotRequest {
        zip: "78704".to_string(),
        service_type: "Panel Upgrade".to_string(),
        job_length_minutes: 120,
        earliest_start: None,
        eligible_crews: Vec::new(),
    };

    let first = scheduler
        .propose_earliest_slot(&request, tuesday_early())
        .expect("opening exists");
    let second = scheduler
        .propose_earliest_slot(&request, tuesday_early())
        .expect("opening exists");

    assert_eq!(first, second);
    assert_eq!(first.crew_id, CrewId("east".to_string()));
    assert!(first.start >= Utc.with_ymd_and_hms(2026, 4, 7, 8, 0, 0).unwrap());
    assert_eq!(
        (first.start - tuesday_early()).num_minutes() % 15,
        0,
        "starts land on the slot step"
    );
}

#[test]
fn many_threads_one_booking() {
    let store = Arc::new(InMemoryCalendar::new(crews()));
    let scheduler = Arc::new(scheduler(store));
    let request = SlotRequest {
        zip: "78704".to_string(),
        service_type: "panel upgrade".to_string(),
        job_length_minutes: 90,
        earliest_start: None,
        eligible_crews: vec![CrewId("east".to_string())],
    };
    let proposal = scheduler
        .propose_earliest_slot(&request, tuesday_early())
        .expect("opening exists");

    let contenders = 6;
    let barrier = Arc::new(Barrier::new(contenders));
    let handles: Vec<_> = (0..contenders)
        .map(|index| {
            let scheduler = Arc::clone(&scheduler);
            let barrier = Arc::clone(&barrier);
            let proposal = proposal.clone();
            thread::spawn(move || {
                barrier.wait();
                scheduler.confirm_slot(&proposal, &format!("customer {index}"), tuesday_early())
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread completes"))
        .collect();

    let winners: Vec<_> = outcomes.iter().filter_map(|outcome| outcome.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    let winner = winners[0];

    for outcome in &outcomes {
        if let Err(SchedulingError::Conflict { alternative, .. }) = outcome {
            let alternative = alternative.as_ref().expect("alternative offered");
            assert!(alternative.end <= winner.start || alternative.start >= winner.end);
        }
    }
}

#[tokio::test]
async fn confirmed_and_conflicting_bookings_land_in_the_csv_trail() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("audit.csv");
    let audit = Arc::new(CsvAuditLog::open(&path).expect("csv opens"));
    let store = Arc::new(InMemoryCalendar::new(crews()));
    let service = LeadDeskService::new(scheduler(store), NotificationRouter::disabled(), audit)
        .with_clock(tuesday_early);

    let estimate = service
        .estimate_slot(SlotEstimateRequest {
            contact: customer("Sam Ortiz"),
            zip: "78704".to_string(),
            service_type: "panel upgrade".to_string(),
            job_length_minutes: Some(90),
            earliest_start: None,
            eligible_crews: Vec::new(),
            hazard: None,
            tracking: None,
        })
        .await
        .expect("slot proposed");

    let request = SlotConfirmRequest {
        contact: customer("Sam Ortiz"),
        proposal: estimate.proposal,
        confirm: true,
        tracking: None,
    };
    service
        .confirm_slot(request.clone())
        .await
        .expect("first confirm wins");
    let replay = service.confirm_slot(request).await;
    assert!(matches!(replay, Err(IntakeError::Conflict { .. })));

    let mut reader = csv::Reader::from_path(&path).expect("csv readable");
    let kinds: Vec<String> = reader
        .records()
        .map(|row| row.expect("row parses")[1].to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["slot_proposed", "booking_confirmed", "booking_conflict"]
    );
}
