//! Decision and scheduling core for the service-request backend.
//!
//! Inbound leads are scored and routed, optionally priced, and booked into crew calendars.
//! Outcomes fan out to notification channels and are written to an audit log.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
