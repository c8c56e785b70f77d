use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::scheduling::{
    Crew, CrewId, InMemoryCalendar, NewAppointment, Scheduler, SchedulingPolicy, SlotRequest,
    TravelEstimate, TravelTimeProvider,
};

pub(super) const JOB_ZIP: &str = "78704";

/// Travel table keyed by (origin, destination) with a flat default.
#[derive(Debug, Clone)]
pub(super) struct TableTravel {
    default_minutes: u32,
    overrides: HashMap<(String, String), u32>,
}

impl TableTravel {
    pub(super) fn flat(minutes: u32) -> Self {
        Self {
            default_minutes: minutes,
            overrides: HashMap::new(),
        }
    }

    pub(super) fn with(mut self, origin: &str, destination: &str, minutes: u32) -> Self {
        self.overrides
            .insert((origin.to_string(), destination.to_string()), minutes);
        self
    }
}

impl TravelTimeProvider for TableTravel {
    fn estimate(&self, origin_zip: &str, destination_zip: &str) -> TravelEstimate {
        let minutes = self
            .overrides
            .get(&(origin_zip.to_string(), destination_zip.to_string()))
            .copied()
            .unwrap_or(self.default_minutes);
        TravelEstimate {
            minutes,
            miles: f64::from(minutes) * 0.4,
        }
    }
}

/// 2026-03-02 is a Monday.
pub(super) fn at(day_offset: i64, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap() + Duration::days(day_offset)
}

pub(super) fn monday_morning() -> DateTime<Utc> {
    at(0, 7, 0)
}

pub(super) fn crew(id: &str, home_zip: &str) -> Crew {
    Crew {
        id: CrewId(id.to_string()),
        name: format!("Crew {}", id.to_uppercase()),
        home_zip: home_zip.to_string(),
        services: Vec::new(),
    }
}

pub(super) fn build_scheduler(
    crews: Vec<Crew>,
    travel: TableTravel,
) -> (Scheduler<InMemoryCalendar>, Arc<InMemoryCalendar>) {
    let store = Arc::new(InMemoryCalendar::new(crews));
    let scheduler = Scheduler::new(store.clone(), Arc::new(travel), SchedulingPolicy::default());
    (scheduler, store)
}

pub(super) fn request(job_length_minutes: u32) -> SlotRequest {
    SlotRequest {
        zip: JOB_ZIP.to_string(),
        service_type: "panel upgrade".to_string(),
        job_length_minutes,
        earliest_start: None,
        eligible_crews: Vec::new(),
    }
}

pub(super) fn block(
    crew_id: &str,
    zip: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> NewAppointment {
    NewAppointment {
        crew_id: CrewId(crew_id.to_string()),
        zip: zip.to_string(),
        service_type: "seeded".to_string(),
        customer_name: "Existing customer".to_string(),
        start,
        end,
        job_length_minutes: u32::try_from((end - start).num_minutes()).unwrap_or(0),
        buffer_before_minutes: 15,
        buffer_after_minutes: 15,
        travel_minutes_from_prev: 0,
        travel_minutes_to_next: 0,
    }
}

/// Fill every working day in the horizon for one crew.
pub(super) fn book_solid(store: &InMemoryCalendar, crew_id: &str, days: i64) {
    for day in 0..days {
        store
            .seed(block(crew_id, "78745", at(day, 8, 0), at(day, 17, 0)))
            .expect("seed succeeds");
    }
}
