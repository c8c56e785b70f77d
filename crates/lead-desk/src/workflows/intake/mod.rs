//! Request entry points tying scoring, pricing, scheduling, notifications, and the audit
//! trail together behind the HTTP API.

pub mod domain;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    HazardAssessment, HazardLevel, LeadRequest, LeadResponse, QuoteRequest, QuoteResponse,
    SlotConfirmRequest, SlotConfirmResponse, SlotEstimateRequest, SlotEstimateResponse, Urgency,
};
pub use router::lead_desk_router;
pub use service::{Clock, IntakeError, LeadDeskService, PersistenceError};
