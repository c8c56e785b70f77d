use std::sync::Arc;

use super::catalog::{PricingCatalog, EV_READY, GENERATOR_INLET};
use super::domain::{AddOnLine, PriceBand, QuoteResult, ServiceSpec};
use crate::workflows::ValidationErrors;

struct BandTemplate {
    id: &'static str,
    label: &'static str,
    min_percent: u64,
    max_percent: u64,
    description: &'static str,
}

/// Percent-of-base multipliers. Each band starts at or above the previous band's ceiling.
const BANDS: [BandTemplate; 3] = [
    BandTemplate {
        id: "essentials",
        label: "Essentials",
        min_percent: 92,
        max_percent: 101,
        description: "Code-compliant install with standard materials and scheduling.",
    },
    BandTemplate {
        id: "preferred",
        label: "Preferred",
        min_percent: 102,
        max_percent: 115,
        description: "Upgraded materials, labeled panel directory, and a 2-year workmanship warranty.",
    },
    BandTemplate {
        id: "priority",
        label: "Priority",
        min_percent: 118,
        max_percent: 132,
        description: "Next-available crew, premium materials, and permit coordination handled for you.",
    },
];

/// Stateless pricer over a shared rate card.
#[derive(Debug, Clone)]
pub struct QuotePricingEngine {
    catalog: Arc<PricingCatalog>,
}

impl QuotePricingEngine {
    pub fn new(catalog: PricingCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    pub fn standard() -> Self {
        Self::new(PricingCatalog::standard())
    }

    pub fn catalog(&self) -> &PricingCatalog {
        &self.catalog
    }

    pub fn validate(&self, spec: &ServiceSpec) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.catalog.labor_for(spec.amps).is_none() {
            let supported: Vec<String> = self
                .catalog
                .supported_amps()
                .iter()
                .map(u16::to_string)
                .collect();
            errors.push(
                "amps",
                format!(
                    "unsupported service size {} (expected one of {})",
                    spec.amps,
                    supported.join(", ")
                ),
            );
        }
        if spec.run_length_feet > self.catalog.max_run_length_feet {
            errors.push(
                "run_length_feet",
                format!("must be at most {}", self.catalog.max_run_length_feet),
            );
        }
        if spec.panel_spaces_needed > self.catalog.max_panel_spaces {
            errors.push(
                "panel_spaces_needed",
                format!("must be at most {}", self.catalog.max_panel_spaces),
            );
        }
        for key in &spec.add_ons {
            if self.catalog.add_on(key).is_none() {
                errors.push("add_ons", format!("unknown add-on '{key}'"));
            }
        }

        errors.into_result()
    }

    pub fn quote(&self, spec: &ServiceSpec) -> Result<QuoteResult, ValidationErrors> {
        self.validate(spec)?;

        let labor = self.catalog.labor_for(spec.amps).unwrap_or_default();
        let run_rate_cents = self.catalog.run_rate_cents_for(spec.amps).unwrap_or_default();
        let run_cost_cents = u64::from(spec.run_length_feet) * u64::from(run_rate_cents);
        let blocks = spec.panel_spaces_needed.div_ceil(self.catalog.panel_block_size);
        let panel_cost = u64::from(blocks) * u64::from(self.catalog.panel_block_rate);

        let add_on_summary: Vec<AddOnLine> = spec
            .add_ons
            .iter()
            .filter_map(|key| self.catalog.add_on(key))
            .map(|item| AddOnLine {
                id: item.key.to_string(),
                label: item.label.to_string(),
                cost: item.cost,
            })
            .collect();
        let add_on_cost: u64 = add_on_summary.iter().map(|line| u64::from(line.cost)).sum();

        let base_price_cents =
            (u64::from(labor) + panel_cost + add_on_cost) * 100 + run_cost_cents;

        let bands = BANDS
            .iter()
            .map(|template| PriceBand {
                id: template.id.to_string(),
                label: template.label.to_string(),
                min: round_to_five_dollars(base_price_cents, template.min_percent),
                max: round_to_five_dollars(base_price_cents, template.max_percent),
                description: template.description.to_string(),
            })
            .collect();

        let recommended_cta = recommended_cta(spec).to_string();

        tracing::debug!(
            amps = spec.amps,
            base_price_cents,
            cta = %recommended_cta,
            "quote priced"
        );

        Ok(QuoteResult {
            bands,
            recommended_cta,
            add_on_summary,
            base_price_cents,
        })
    }
}

impl Default for QuotePricingEngine {
    fn default() -> Self {
        Self::standard()
    }
}

/// `cents × percent / 100`, rounded half-up to the nearest $5 and returned in dollars.
pub(crate) fn round_to_five_dollars(cents: u64, percent: u64) -> u32 {
    let scaled = cents * percent;
    let fives = (scaled + 25_000) / 50_000;
    u32::try_from(fives * 5).unwrap_or(u32::MAX)
}

fn recommended_cta(spec: &ServiceSpec) -> &'static str {
    if spec.add_ons.contains(EV_READY) {
        "Book an EV charger readiness visit"
    } else if spec.amps >= 200 {
        "Schedule a 200A upgrade visit"
    } else if spec.add_ons.contains(GENERATOR_INLET) {
        "Book a generator inlet consult"
    } else {
        "Schedule a safety inspection"
    }
}
