use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CrewId(pub String);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned by the calendar store when an appointment commits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A schedulable field crew. An empty `services` list means the crew takes any job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub id: CrewId,
    pub name: String,
    pub home_zip: String,
    #[serde(default)]
    pub services: Vec<String>,
}

impl Crew {
    pub fn handles(&self, service_type: &str) -> bool {
        self.services.is_empty()
            || self
                .services
                .iter()
                .any(|service| service.eq_ignore_ascii_case(service_type.trim()))
    }
}

/// Appointment details before the store has accepted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub crew_id: CrewId,
    pub zip: String,
    pub service_type: String,
    pub customer_name: String,
    pub start: DateTime<Utc>,
    /// `start + job length + buffer after`.
    pub end: DateTime<Utc>,
    pub job_length_minutes: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub travel_minutes_from_prev: u32,
    pub travel_minutes_to_next: u32,
}

impl NewAppointment {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }

    pub(crate) fn into_appointment(self, booking_id: BookingId) -> Appointment {
        Appointment {
            booking_id,
            crew_id: self.crew_id,
            zip: self.zip,
            service_type: self.service_type,
            customer_name: self.customer_name,
            start: self.start,
            end: self.end,
            job_length_minutes: self.job_length_minutes,
            buffer_before_minutes: self.buffer_before_minutes,
            buffer_after_minutes: self.buffer_after_minutes,
            travel_minutes_from_prev: self.travel_minutes_from_prev,
            travel_minutes_to_next: self.travel_minutes_to_next,
        }
    }
}

/// A committed block on a crew calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub booking_id: BookingId,
    pub crew_id: CrewId,
    pub zip: String,
    pub service_type: String,
    pub customer_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub job_length_minutes: u32,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    pub travel_minutes_from_prev: u32,
    pub travel_minutes_to_next: u32,
}

impl Appointment {
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// Search input. An empty `eligible_crews` list means every crew that handles the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRequest {
    pub zip: String,
    pub service_type: String,
    pub job_length_minutes: u32,
    #[serde(default)]
    pub earliest_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub eligible_crews: Vec<CrewId>,
}

/// Best-effort earliest opening. Holds nothing on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotProposal {
    pub crew_id: CrewId,
    pub crew_name: String,
    pub zip: String,
    pub service_type: String,
    pub job_length_minutes: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub travel_minutes_from_prev: u32,
    pub travel_minutes_to_next: u32,
    pub travel_miles: f64,
    pub buffer_before_minutes: u32,
    pub buffer_after_minutes: u32,
    /// Crew restriction of the search that produced this proposal, reused when a
    /// conflicting confirm needs an alternative.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eligible_crews: Vec<CrewId>,
}

impl SlotProposal {
    pub fn total_travel_minutes(&self) -> u32 {
        self.travel_minutes_from_prev + self.travel_minutes_to_next
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: BookingId,
    pub crew_id: CrewId,
    pub crew_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
