//! Lead scoring: turns an inbound inquiry into a priority score, tier, and routing channel.

pub mod domain;
mod scoring;


pub use domain::{
    ContactDetails, LeadIntent, LeadProfile, LeadRoute, LeadTier, ScoreComponent, ScoreFactor,
    ScoreResult, TrackingMeta,
};
pub use scoring::{LeadScoringEngine, ScoringTables};
