use crate::infra::seeded_crews;
use clap::Args;
use lead_desk::error::AppError;
use lead_desk::workflows::audit::{AuditKind, InMemoryAuditLog};
use lead_desk::workflows::intake::{
    IntakeError, LeadDeskService, LeadRequest, QuoteRequest, SlotConfirmRequest,
    SlotEstimateRequest,
};
use lead_desk::workflows::leads::{ContactDetails, LeadIntent, LeadProfile};
use lead_desk::workflows::notifications::{NotificationAttempt, NotificationRouter};
use lead_desk::workflows::quotes::ServiceSpec;
use lead_desk::workflows::scheduling::{
    InMemoryCalendar, Scheduler, SchedulingPolicy, ZipCentroidTravel,
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Number of customers racing to confirm the same proposal
    #[arg(long, default_value_t = 4)]
    pub(crate) contenders: usize,
    /// Service zip used for the quote and the booking
    #[arg(long, default_value = "78704")]
    pub(crate) zip: String,
}

type DemoService = LeadDeskService<InMemoryCalendar, InMemoryAuditLog>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { contenders, zip } = args;

    let audit = InMemoryAuditLog::new();
    let scheduler = Scheduler::new(
        Arc::new(InMemoryCalendar::new(seeded_crews())),
        Arc::new(ZipCentroidTravel::standard()),
        SchedulingPolicy::default(),
    );
    let service: Arc<DemoService> = Arc::new(LeadDeskService::new(
        scheduler,
        NotificationRouter::disabled(),
        Arc::new(audit.clone()),
    ));

    println!("Lead desk demo (notification channels disabled)");

    println!("\nLead scoring");
    let lead = LeadRequest {
        contact: demo_contact("Avery Brooks", &zip),
        lead: LeadProfile {
            zip: Some(zip.clone()),
            intent: LeadIntent::Book,
            service_category: "Panel upgrade".to_string(),
            budget_range: "$3k-5k".to_string(),
            notes: "Breaker trips when the dryer runs".to_string(),
        },
        tracking: None,
    };
    match service.submit_lead(lead).await {
        Ok(response) => {
            println!(
                "- score {} -> tier {} via {}",
                response.score.score,
                response.score.tier.label(),
                response.score.route.label()
            );
            for component in &response.score.breakdown {
                println!(
                    "  - {:?}: {} ({})",
                    component.factor, component.points, component.notes
                );
            }
            print_attempts(&response.notifications);
        }
        Err(err) => println!("- lead rejected: {err}"),
    }

    println!("\nQuote");
    let quote = QuoteRequest {
        contact: demo_contact("Avery Brooks", &zip),
        job: ServiceSpec {
            amps: 200,
            run_length_feet: 35,
            panel_spaces_needed: 40,
            add_ons: BTreeSet::from(["ev_ready".to_string()]),
        },
        lead: None,
        tracking: None,
    };
    match service.price_quote(quote).await {
        Ok(response) => {
            for band in &response.quote.bands {
                println!("- {}: ${} to ${}", band.label, band.min, band.max);
            }
            println!("  Recommended next step: {}", response.quote.recommended_cta);
        }
        Err(err) => println!("- quote rejected: {err}"),
    }

    println!("\nSlot proposal");
    let estimate = SlotEstimateRequest {
        contact: demo_contact("Avery Brooks", &zip),
        zip: zip.clone(),
        service_type: "panel upgrade".to_string(),
        job_length_minutes: Some(90),
        earliest_start: None,
        eligible_crews: Vec::new(),
        hazard: None,
        tracking: None,
    };
    let proposal = match service.estimate_slot(estimate).await {
        Ok(response) => response.proposal,
        Err(err) => {
            println!("- no proposal: {err}");
            return Ok(());
        }
    };
    println!(
        "- {} at {} (travel {} min in / {} min out, {:.1} mi)",
        proposal.crew_name,
        proposal.start.format("%a %Y-%m-%d %H:%M UTC"),
        proposal.travel_minutes_from_prev,
        proposal.travel_minutes_to_next,
        proposal.travel_miles
    );

    println!("\n{contenders} customers confirm the same proposal at once");
    let mut attempts = tokio::task::JoinSet::new();
    for index in 0..contenders.max(1) {
        let service = service.clone();
        let request = SlotConfirmRequest {
            contact: demo_contact(&format!("Customer {}", index + 1), &zip),
            proposal: proposal.clone(),
            confirm: true,
            tracking: None,
        };
        attempts.spawn(async move { (index + 1, service.confirm_slot(request).await) });
    }

    while let Some(joined) = attempts.join_next().await {
        let (customer, outcome) = match joined {
            Ok(result) => result,
            Err(err) => {
                println!("- confirm task failed: {err}");
                continue;
            }
        };
        match outcome {
            Ok(confirmed) => println!(
                "- customer {customer}: booked {} with {}",
                confirmed.booking.booking_id, confirmed.booking.crew_name
            ),
            Err(IntakeError::Conflict {
                reason,
                alternative,
            }) => match alternative {
                Some(alternative) => println!(
                    "- customer {customer}: conflict ({reason}); next opening {} at {}",
                    alternative.crew_name,
                    alternative.start.format("%a %H:%M UTC")
                ),
                None => println!("- customer {customer}: conflict ({reason}); no alternative"),
            },
            Err(err) => println!("- customer {customer}: {err}"),
        }
    }

    println!("\nAudit trail");
    for kind in [
        AuditKind::LeadScored,
        AuditKind::QuoteIssued,
        AuditKind::SlotProposed,
        AuditKind::BookingConfirmed,
        AuditKind::BookingConflict,
    ] {
        println!("- {}: {}", kind.label(), audit.of_kind(kind).len());
    }

    Ok(())
}

fn demo_contact(name: &str, zip: &str) -> ContactDetails {
    ContactDetails {
        name: name.to_string(),
        phone: Some("+15125550100".to_string()),
        email: None,
        zip: Some(zip.to_string()),
    }
}

fn print_attempts(attempts: &[NotificationAttempt]) {
    for attempt in attempts {
        match &attempt.detail {
            Some(detail) => println!(
                "  notify {}: {} ({detail})",
                attempt.channel,
                attempt.status.label()
            ),
            None => println!("  notify {}: {}", attempt.channel, attempt.status.label()),
        }
    }
}
