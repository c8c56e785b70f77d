//! Crew slot search and booking.
//!
//! Proposals are computed reads over the calendar and may go stale. Only
//! [`Scheduler::confirm_slot`] writes, and it re-validates the exact interval inside the
//! store's per-crew commit so overlapping confirmations on one crew cannot both land.

mod booking;
pub mod calendar;
pub mod domain;
mod error;
mod policy;
mod search;
pub mod travel;

#[cfg(test)]
mod tests;

pub use calendar::{CalendarError, CalendarStore, CommitOutcome, InMemoryCalendar, PlacementGuard};
pub use domain::{
    Appointment, BookingConfirmation, BookingId, Crew, CrewId, NewAppointment, SlotProposal,
    SlotRequest,
};
pub use error::{PlacementRejection, SchedulingError};
pub use policy::SchedulingPolicy;
pub use search::Scheduler;
pub use travel::{TravelEstimate, TravelTimeProvider, ZipCentroidTravel};
