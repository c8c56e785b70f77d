//! Audit trail of request outcomes, kept in memory or appended to a CSV file.

mod csv_log;
pub mod domain;
mod memory;

pub use csv_log::CsvAuditLog;
pub use domain::{AuditError, AuditKind, AuditLog, AuditRecord};
pub use memory::InMemoryAuditLog;
