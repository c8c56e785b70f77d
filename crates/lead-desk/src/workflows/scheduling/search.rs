use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::calendar::CalendarStore;
use super::domain::{Appointment, Crew, SlotProposal, SlotRequest};
use super::error::SchedulingError;
use super::policy::{minutes, SchedulingPolicy};
use super::travel::{TravelEstimate, TravelTimeProvider};
use crate::workflows::validation::is_well_formed_zip;
use crate::workflows::ValidationErrors;

/// Slot search and booking over a calendar store. Holds no calendar state of its own.
pub struct Scheduler<C> {
    pub(super) store: Arc<C>,
    pub(super) travel: Arc<dyn TravelTimeProvider>,
    pub(super) policy: SchedulingPolicy,
}

/// How far ahead a caller may push `earliest_start`.
pub(crate) const MAX_EARLIEST_START_DAYS: i64 = 365;

/// Where the search starts and how late a proposed job may end on the day being walked.
#[derive(Clone, Copy)]
struct SearchBounds {
    start: DateTime<Utc>,
    latest_end: DateTime<Utc>,
}

/// Free stretch of a crew's working day between two commitments.
struct Gap<'a> {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    prev_zip: &'a str,
    next_zip: Option<&'a str>,
}

impl<C> Scheduler<C>
where
    C: CalendarStore,
{
    pub fn new(
        store: Arc<C>,
        travel: Arc<dyn TravelTimeProvider>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            store,
            travel,
            policy,
        }
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn store(&self) -> &Arc<C> {
        &self.store
    }

    /// Earliest feasible opening across the eligible crews. Ties go to the lower total
    /// travel time, then the lower crew id. Read-only.
    pub fn propose_earliest_slot(
        &self,
        request: &SlotRequest,
        now: DateTime<Utc>,
    ) -> Result<SlotProposal, SchedulingError> {
        validate_request(request, now)?;

        let crews = self.eligible_crews(request)?;
        let search_start = request
            .earliest_start
            .map_or(now, |earliest| earliest.max(now));
        let search_end = search_start
            .checked_add_signed(self.policy.horizon())
            .ok_or_else(|| {
                ValidationErrors::single("earliest_start", "search horizon is out of range")
            })?;
        // Whole days on both ends so the job after the horizon edge is still seen.
        let fetch_from = start_of_day(search_start.date_naive()).unwrap_or(search_start);
        let fetch_to = search_end
            .date_naive()
            .succ_opt()
            .and_then(start_of_day)
            .unwrap_or(search_end);

        let mut best: Option<SlotProposal> = None;
        for crew in &crews {
            let appointments = self.store.appointments(&crew.id, fetch_from, fetch_to)?;
            let Some(candidate) =
                self.earliest_for_crew(crew, &appointments, request, search_start, search_end)
            else {
                continue;
            };
            best = match best {
                Some(current) if compare_proposals(&candidate, &current) != Ordering::Less => {
                    Some(current)
                }
                _ => Some(candidate),
            };
        }

        tracing::debug!(
            crews = crews.len(),
            zip = %request.zip,
            job_length_minutes = request.job_length_minutes,
            found = best.is_some(),
            "slot search finished"
        );

        best.ok_or(SchedulingError::NoAvailability {
            horizon_days: self.policy.horizon_days,
        })
    }

    pub(super) fn eligible_crews(&self, request: &SlotRequest) -> Result<Vec<Crew>, SchedulingError> {
        let mut crews = self.store.crews()?;

        if request.eligible_crews.is_empty() {
            crews.retain(|crew| crew.handles(&request.service_type));
        } else {
            if let Some(missing) = request
                .eligible_crews
                .iter()
                .find(|id| !crews.iter().any(|crew| &crew.id == *id))
            {
                return Err(SchedulingError::UnknownCrew(missing.clone()));
            }
            crews.retain(|crew| request.eligible_crews.contains(&crew.id));
        }

        crews.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(crews)
    }

    fn earliest_for_crew(
        &self,
        crew: &Crew,
        appointments: &[Appointment],
        request: &SlotRequest,
        search_start: DateTime<Utc>,
        search_end: DateTime<Utc>,
    ) -> Option<SlotProposal> {
        let mut day = search_start.date_naive();
        let last_day = search_end.date_naive();

        while day <= last_day {
            if let Some((open, close)) = self.policy.workday_window(day) {
                let bounds = SearchBounds {
                    start: search_start,
                    latest_end: close.min(search_end),
                };
                if bounds.latest_end > search_start {
                    let todays: Vec<&Appointment> = appointments
                        .iter()
                        .filter(|appointment| appointment.overlaps(open, close))
                        .collect();
                    let found = self.earliest_in_day(crew, &todays, request, open, close, bounds);
                    if found.is_some() {
                        return found;
                    }
                }
            }
            day = day.succ_opt()?;
        }

        None
    }

    fn earliest_in_day(
        &self,
        crew: &Crew,
        todays: &[&Appointment],
        request: &SlotRequest,
        open: DateTime<Utc>,
        close: DateTime<Utc>,
        bounds: SearchBounds,
    ) -> Option<SlotProposal> {
        let mut cursor = open;
        let mut prev_zip = crew.home_zip.as_str();

        for index in 0..=todays.len() {
            let next = todays.get(index).copied();
            let gap_end = next.map_or(close, |appointment| appointment.start.min(close));

            if gap_end > cursor {
                let gap = Gap {
                    start: cursor,
                    end: gap_end,
                    prev_zip,
                    next_zip: next.map(|appointment| appointment.zip.as_str()),
                };
                if let Some(proposal) = self.fit_in_gap(crew, &gap, request, bounds) {
                    return Some(proposal);
                }
            }

            if let Some(appointment) = next {
                cursor = cursor.max(appointment.end);
                prev_zip = appointment.zip.as_str();
            }
        }

        None
    }

    /// Gap must hold travel in, buffer before, the job, buffer after, and travel out.
    /// The job itself must also finish inside the horizon.
    fn fit_in_gap(
        &self,
        crew: &Crew,
        gap: &Gap<'_>,
        request: &SlotRequest,
        bounds: SearchBounds,
    ) -> Option<SlotProposal> {
        let from_prev = self.travel.estimate(gap.prev_zip, &request.zip);
        let to_next = gap
            .next_zip
            .map_or(TravelEstimate::NONE, |zip| self.travel.estimate(&request.zip, zip));

        let depart = gap.start.max(bounds.start);
        let start = self
            .policy
            .round_up(depart + minutes(from_prev.minutes) + self.policy.buffer_before());
        let end = start + minutes(request.job_length_minutes) + self.policy.buffer_after();

        if end + minutes(to_next.minutes) > gap.end || end > bounds.latest_end {
            return None;
        }

        Some(SlotProposal {
            crew_id: crew.id.clone(),
            crew_name: crew.name.clone(),
            zip: request.zip.trim().to_string(),
            service_type: request.service_type.trim().to_string(),
            job_length_minutes: request.job_length_minutes,
            start,
            end,
            travel_minutes_from_prev: from_prev.minutes,
            travel_minutes_to_next: to_next.minutes,
            travel_miles: from_prev.miles,
            buffer_before_minutes: self.policy.buffer_before_minutes,
            buffer_after_minutes: self.policy.buffer_after_minutes,
            eligible_crews: request.eligible_crews.clone(),
        })
    }
}

fn compare_proposals(left: &SlotProposal, right: &SlotProposal) -> Ordering {
    left.start
        .cmp(&right.start)
        .then_with(|| left.total_travel_minutes().cmp(&right.total_travel_minutes()))
        .then_with(|| left.crew_id.cmp(&right.crew_id))
}

fn start_of_day(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

pub(super) fn validate_request(
    request: &SlotRequest,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if !is_well_formed_zip(&request.zip) {
        errors.push("zip", "must be a 5-digit postal code");
    }
    if request.service_type.trim().is_empty() {
        errors.push("service_type", "is required");
    }
    if request.job_length_minutes == 0 {
        errors.push("job_length_minutes", "must be greater than zero");
    }
    if let Some(earliest) = request.earliest_start {
        let limit = now.checked_add_signed(Duration::days(MAX_EARLIEST_START_DAYS));
        if limit.map_or(true, |limit| earliest > limit) {
            errors.push(
                "earliest_start",
                format!("must be within {MAX_EARLIEST_START_DAYS} days"),
            );
        }
    }
    errors.into_result()
}
