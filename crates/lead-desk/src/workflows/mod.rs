pub mod audit;
pub mod intake;
pub mod leads;
pub mod notifications;
pub mod quotes;
pub mod scheduling;
mod validation;

pub use validation::{FieldError, ValidationErrors};
