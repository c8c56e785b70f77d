use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Electrical job parameters supplied by the estimate form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub amps: u16,
    pub run_length_feet: u32,
    pub panel_spaces_needed: u32,
    #[serde(default)]
    pub add_ons: BTreeSet<String>,
}

/// Price range for one service level, in whole dollars rounded to $5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBand {
    pub id: String,
    pub label: String,
    pub min: u32,
    pub max: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOnLine {
    pub id: String,
    pub label: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub bands: Vec<PriceBand>,
    pub recommended_cta: String,
    pub add_on_summary: Vec<AddOnLine>,
    /// Unrounded sum of labor, run, panel, and add-on costs.
    pub base_price_cents: u64,
}

impl QuoteResult {
    pub fn band(&self, id: &str) -> Option<&PriceBand> {
        self.bands.iter().find(|band| band.id == id)
    }
}
