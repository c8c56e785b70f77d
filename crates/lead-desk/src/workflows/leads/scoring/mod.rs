mod rules;
mod tables;

pub use tables::ScoringTables;

use std::sync::Arc;

use super::domain::{LeadProfile, LeadTier, ScoreComponent, ScoreFactor, ScoreResult};
use rules::{BASE_SCORE, MAX_SCORE, TIER_A_THRESHOLD};

#[cfg(test)]
pub(crate) use rules::{contains_phrase, income_points, parse_budget_amount};

/// Stateless scorer over shared reference tables. Never fails for a well-typed profile.
#[derive(Debug, Clone)]
pub struct LeadScoringEngine {
    tables: Arc<ScoringTables>,
}

impl LeadScoringEngine {
    pub fn new(tables: ScoringTables) -> Self {
        Self {
            tables: Arc::new(tables),
        }
    }

    pub fn standard() -> Self {
        Self::new(ScoringTables::standard())
    }

    pub fn score(&self, profile: &LeadProfile) -> ScoreResult {
        let breakdown = vec![
            ScoreComponent {
                factor: ScoreFactor::Base,
                points: BASE_SCORE,
                notes: "base score".to_string(),
            },
            rules::zip_income_component(profile.zip.as_deref(), &self.tables),
            rules::intent_component(profile.intent),
            rules::job_size_component(
                &profile.service_category,
                &profile.notes,
                &profile.budget_range,
                &self.tables,
            ),
        ];

        let total: u32 = breakdown.iter().map(|c| u32::from(c.points)).sum();
        let score = total.min(u32::from(MAX_SCORE)) as u8;
        let tier = if score >= TIER_A_THRESHOLD {
            LeadTier::A
        } else {
            LeadTier::B
        };

        tracing::debug!(
            score,
            tier = tier.label(),
            intent = profile.intent.label(),
            "lead scored"
        );

        ScoreResult {
            score,
            tier,
            route: tier.route(),
            breakdown,
        }
    }
}

impl Default for LeadScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}
