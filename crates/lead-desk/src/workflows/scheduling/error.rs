use chrono::{DateTime, Utc};

use super::calendar::CalendarError;
use super::domain::{BookingId, CrewId, SlotProposal};
use crate::workflows::ValidationErrors;

/// Why a specific interval cannot be placed on a crew calendar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementRejection {
    #[error("interval overlaps booking {0}")]
    Overlap(BookingId),
    #[error("not enough travel and staging time after the previous job (needs until {required})")]
    TooSoonAfterPrevious { required: DateTime<Utc> },
    #[error("not enough travel time before the next job at {next_start}")]
    TooCloseToNext { next_start: DateTime<Utc> },
    #[error("interval falls outside working hours")]
    OutsideWorkday,
    #[error("proposed start {0} has already passed")]
    Expired(DateTime<Utc>),
}

/// Outcomes of slot search and booking that callers handle as typed results.
#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("no feasible slot within {horizon_days} days")]
    NoAvailability { horizon_days: u32 },
    /// The alternative is searched over the same crews as the losing proposal.
    #[error("slot no longer available: {reason}")]
    Conflict {
        reason: PlacementRejection,
        alternative: Option<Box<SlotProposal>>,
    },
    #[error("unknown crew {0}")]
    UnknownCrew(CrewId),
    #[error(transparent)]
    Store(#[from] CalendarError),
}
