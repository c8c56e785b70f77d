use chrono::{DateTime, Duration, Utc};

use super::calendar::{CalendarStore, CommitOutcome};
use super::domain::{
    Appointment, BookingConfirmation, Crew, NewAppointment, SlotProposal, SlotRequest,
};
use super::error::{PlacementRejection, SchedulingError};
use super::policy::minutes;
use super::search::{Scheduler, MAX_EARLIEST_START_DAYS};
use crate::workflows::validation::is_well_formed_zip;
use crate::workflows::ValidationErrors;

impl<C> Scheduler<C>
where
    C: CalendarStore,
{
    /// Commit a proposal. The exact proposed interval is re-checked against the live
    /// calendar inside the store's commit; no fresh search is run unless it loses.
    pub fn confirm_slot(
        &self,
        proposal: &SlotProposal,
        customer_name: &str,
        now: DateTime<Utc>,
    ) -> Result<BookingConfirmation, SchedulingError> {
        validate_proposal(proposal, now, self.policy.horizon())?;

        let crew = self
            .store
            .crews()?
            .into_iter()
            .find(|crew| crew.id == proposal.crew_id)
            .ok_or_else(|| SchedulingError::UnknownCrew(proposal.crew_id.clone()))?;

        let start = proposal.start;
        let end = start
            .checked_add_signed(minutes(proposal.job_length_minutes) + self.policy.buffer_after())
            .ok_or_else(|| ValidationErrors::single("proposal.start", "is out of range"))?;
        let appointment = NewAppointment {
            crew_id: crew.id.clone(),
            zip: proposal.zip.clone(),
            service_type: proposal.service_type.clone(),
            customer_name: customer_name.to_string(),
            start,
            end,
            job_length_minutes: proposal.job_length_minutes,
            buffer_before_minutes: self.policy.buffer_before_minutes,
            buffer_after_minutes: self.policy.buffer_after_minutes,
            travel_minutes_from_prev: proposal.travel_minutes_from_prev,
            travel_minutes_to_next: proposal.travel_minutes_to_next,
        };

        let guard = |existing: &[Appointment]| {
            self.check_placement(&crew, existing, &proposal.zip, start, end, now)
        };

        let outcome = self.store.commit(appointment, &guard)?;
        match outcome {
            CommitOutcome::Committed(committed) => {
                tracing::info!(
                    booking_id = %committed.booking_id,
                    crew = %crew.id,
                    start = %committed.start,
                    end = %committed.end,
                    "booking committed"
                );
                Ok(BookingConfirmation {
                    booking_id: committed.booking_id,
                    crew_id: crew.id,
                    crew_name: crew.name,
                    start: committed.start,
                    end: committed.end,
                })
            }
            CommitOutcome::Rejected(reason) => {
                tracing::info!(crew = %crew.id, start = %start, %reason, "booking rejected");
                let retry = SlotRequest {
                    zip: proposal.zip.clone(),
                    service_type: proposal.service_type.clone(),
                    job_length_minutes: proposal.job_length_minutes,
                    earliest_start: None,
                    eligible_crews: proposal.eligible_crews.clone(),
                };
                let alternative = match self.propose_earliest_slot(&retry, now) {
                    Ok(alternative) => Some(Box::new(alternative)),
                    Err(SchedulingError::NoAvailability { .. }) => None,
                    Err(other) => return Err(other),
                };
                Err(SchedulingError::Conflict {
                    reason,
                    alternative,
                })
            }
        }
    }

    /// Feasibility of one exact interval against a crew's committed appointments.
    pub(super) fn check_placement(
        &self,
        crew: &Crew,
        existing: &[Appointment],
        zip: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), PlacementRejection> {
        if start < now {
            return Err(PlacementRejection::Expired(start));
        }

        let (open, close) = self
            .policy
            .workday_window(start.date_naive())
            .ok_or(PlacementRejection::OutsideWorkday)?;
        if start < open || end > close {
            return Err(PlacementRejection::OutsideWorkday);
        }

        if let Some(clash) = existing.iter().find(|appointment| appointment.overlaps(start, end)) {
            return Err(PlacementRejection::Overlap(clash.booking_id.clone()));
        }

        let todays = existing
            .iter()
            .filter(|appointment| appointment.overlaps(open, close));
        let previous = todays
            .clone()
            .filter(|appointment| appointment.end <= start)
            .max_by_key(|appointment| appointment.end);
        let next = todays
            .filter(|appointment| appointment.start >= end)
            .min_by_key(|appointment| appointment.start);

        let (ready_from, prev_zip) = match previous {
            Some(appointment) => (appointment.end.max(open), appointment.zip.as_str()),
            None => (open, crew.home_zip.as_str()),
        };
        let from_prev = self.travel.estimate(prev_zip, zip);
        let required = ready_from + minutes(from_prev.minutes) + self.policy.buffer_before();
        if start < required {
            return Err(PlacementRejection::TooSoonAfterPrevious { required });
        }

        if let Some(next) = next {
            let to_next = self.travel.estimate(zip, &next.zip);
            if end + minutes(to_next.minutes) > next.start {
                return Err(PlacementRejection::TooCloseToNext {
                    next_start: next.start,
                });
            }
        }

        Ok(())
    }
}

fn validate_proposal(
    proposal: &SlotProposal,
    now: DateTime<Utc>,
    horizon: Duration,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if proposal.crew_id.0.trim().is_empty() {
        errors.push("proposal.crew_id", "is required");
    }
    if !is_well_formed_zip(&proposal.zip) {
        errors.push("proposal.zip", "must be a 5-digit postal code");
    }
    if proposal.job_length_minutes == 0 {
        errors.push("proposal.job_length_minutes", "must be greater than zero");
    }
    let latest = now
        .checked_add_signed(Duration::days(MAX_EARLIEST_START_DAYS))
        .and_then(|limit| limit.checked_add_signed(horizon));
    if latest.map_or(true, |latest| proposal.start > latest) {
        errors.push("proposal.start", "is beyond the booking window");
    }
    errors.into_result()
}
