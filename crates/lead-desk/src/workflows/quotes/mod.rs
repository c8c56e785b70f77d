//! Quote pricing: job parameters in, three ordered price bands and a next step out.

mod catalog;
pub mod domain;
mod pricing;


pub use catalog::{AddOnItem, PricingCatalog};
pub use domain::{AddOnLine, PriceBand, QuoteResult, ServiceSpec};
pub use pricing::QuotePricingEngine;
