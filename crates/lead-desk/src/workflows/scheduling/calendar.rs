use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::domain::{Appointment, BookingId, Crew, CrewId, NewAppointment};
use super::error::PlacementRejection;

/// Feasibility re-check run by the store against the crew's committed appointments while
/// the crew's calendar is held exclusively.
pub type PlacementGuard<'a> =
    dyn Fn(&[Appointment]) -> Result<(), PlacementRejection> + Send + Sync + 'a;

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(Appointment),
    Rejected(PlacementRejection),
}

/// Authoritative crew calendars.
///
/// `commit` must behave as one atomic step per crew: the non-overlap constraint and the
/// guard are evaluated against the same state the insert lands in. Reads may be stale.
pub trait CalendarStore: Send + Sync {
    fn crews(&self) -> Result<Vec<Crew>, CalendarError>;
    /// Appointments for a crew that overlap `[from, until)`, ordered by start.
    fn appointments(
        &self,
        crew_id: &CrewId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CalendarError>;
    fn commit(
        &self,
        appointment: NewAppointment,
        guard: &PlacementGuard<'_>,
    ) -> Result<CommitOutcome, CalendarError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("crew {0} has no calendar")]
    UnknownCrew(CrewId),
    #[error("calendar store unavailable: {0}")]
    Unavailable(String),
}

/// Single-process store. Each crew's calendar sits behind its own mutex, so commits on
/// different crews never contend.
#[derive(Debug)]
pub struct InMemoryCalendar {
    crews: BTreeMap<CrewId, Crew>,
    calendars: HashMap<CrewId, Mutex<Vec<Appointment>>>,
    sequence: AtomicU64,
}

impl InMemoryCalendar {
    pub fn new(crews: impl IntoIterator<Item = Crew>) -> Self {
        let crews: BTreeMap<CrewId, Crew> = crews
            .into_iter()
            .map(|crew| (crew.id.clone(), crew))
            .collect();
        let calendars = crews
            .keys()
            .map(|id| (id.clone(), Mutex::new(Vec::new())))
            .collect();

        Self {
            crews,
            calendars,
            sequence: AtomicU64::new(1),
        }
    }

    /// Insert without travel checks; the overlap constraint still applies.
    pub fn seed(&self, appointment: NewAppointment) -> Result<CommitOutcome, CalendarError> {
        self.commit(appointment, &|_: &[Appointment]| Ok(()))
    }

    fn calendar(&self, crew_id: &CrewId) -> Result<&Mutex<Vec<Appointment>>, CalendarError> {
        self.calendars
            .get(crew_id)
            .ok_or_else(|| CalendarError::UnknownCrew(crew_id.clone()))
    }

    fn next_booking_id(&self) -> BookingId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        BookingId(format!("bk-{id:06}"))
    }
}

impl CalendarStore for InMemoryCalendar {
    fn crews(&self) -> Result<Vec<Crew>, CalendarError> {
        Ok(self.crews.values().cloned().collect())
    }

    fn appointments(
        &self,
        crew_id: &CrewId,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, CalendarError> {
        let guard = self
            .calendar(crew_id)?
            .lock()
            .map_err(|_| CalendarError::Unavailable("calendar mutex poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|appointment| appointment.overlaps(from, until))
            .cloned()
            .collect())
    }

    fn commit(
        &self,
        appointment: NewAppointment,
        guard: &PlacementGuard<'_>,
    ) -> Result<CommitOutcome, CalendarError> {
        let mut calendar = self
            .calendar(&appointment.crew_id)?
            .lock()
            .map_err(|_| CalendarError::Unavailable("calendar mutex poisoned".to_string()))?;

        if let Some(existing) = calendar
            .iter()
            .find(|existing| existing.overlaps(appointment.start, appointment.end))
        {
            return Ok(CommitOutcome::Rejected(PlacementRejection::Overlap(
                existing.booking_id.clone(),
            )));
        }

        if let Err(rejection) = guard(calendar.as_slice()) {
            return Ok(CommitOutcome::Rejected(rejection));
        }

        let committed = appointment.into_appointment(self.next_booking_id());
        let position = calendar.partition_point(|existing| existing.start < committed.start);
        calendar.insert(position, committed.clone());

        Ok(CommitOutcome::Committed(committed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn crew(id: &str) -> Crew {
        Crew {
            id: CrewId(id.to_string()),
            name: format!("Crew {id}"),
            home_zip: "78704".to_string(),
            services: Vec::new(),
        }
    }

    fn block(crew_id: &str, start_hour: u32, end_hour: u32) -> NewAppointment {
        NewAppointment {
            crew_id: CrewId(crew_id.to_string()),
            zip: "78704".to_string(),
            service_type: "panel upgrade".to_string(),
            customer_name: "Seed".to_string(),
            start: Utc.with_ymd_and_hms(2026, 3, 2, start_hour, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 3, 2, end_hour, 0, 0).unwrap(),
            job_length_minutes: 60,
            buffer_before_minutes: 15,
            buffer_after_minutes: 15,
            travel_minutes_from_prev: 0,
            travel_minutes_to_next: 0,
        }
    }

    #[test]
    fn commits_keep_calendar_sorted_and_assign_ids() {
        let store = InMemoryCalendar::new([crew("a")]);
        store.seed(block("a", 13, 14)).expect("store available");
        store.seed(block("a", 9, 10)).expect("store available");

        let day_start = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let day_end = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();
        let appointments = store
            .appointments(&CrewId("a".to_string()), day_start, day_end)
            .expect("store available");

        assert_eq!(appointments.len(), 2);
        assert!(appointments[0].start < appointments[1].start);
        assert_ne!(appointments[0].booking_id, appointments[1].booking_id);
    }

    #[test]
    fn overlap_constraint_rejects_regardless_of_guard() {
        let store = InMemoryCalendar::new([crew("a")]);
        let first = match store.seed(block("a", 9, 11)).expect("store available") {
            CommitOutcome::Committed(appointment) => appointment,
            other => panic!("expected commit, got {other:?}"),
        };

        let outcome = store.seed(block("a", 10, 12)).expect("store available");
        assert_eq!(
            outcome,
            CommitOutcome::Rejected(PlacementRejection::Overlap(first.booking_id))
        );
    }

    #[test]
    fn guard_rejection_leaves_calendar_untouched() {
        let store = InMemoryCalendar::new([crew("a")]);
        let outcome = store
            .commit(block("a", 9, 10), &|_: &[Appointment]| {
                Err(PlacementRejection::OutsideWorkday)
            })
            .expect("store available");
        assert_eq!(
            outcome,
            CommitOutcome::Rejected(PlacementRejection::OutsideWorkday)
        );

        let all = store
            .appointments(
                &CrewId("a".to_string()),
                Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap(),
            )
            .expect("store available");
        assert!(all.is_empty());
    }

    #[test]
    fn unknown_crew_is_a_store_error() {
        let store = InMemoryCalendar::new([crew("a")]);
        let err = store.seed(block("zz", 9, 10)).expect_err("no such crew");
        assert!(matches!(err, CalendarError::UnknownCrew(id) if id.0 == "zz"));
    }
}
