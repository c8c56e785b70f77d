/// A selectable extra with a flat price in whole dollars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOnItem {
    pub key: &'static str,
    pub label: &'static str,
    pub cost: u32,
}

pub(crate) const EV_READY: &str = "ev_ready";
pub(crate) const GENERATOR_INLET: &str = "generator_inlet";

/// Rate card for electrical service work. All amounts are whole dollars except the per-foot
/// run rates, which are cents.
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    /// Supported service sizes and their base labor, ascending by amps.
    pub labor_by_amps: Vec<(u16, u32)>,
    /// Highest amps covered by a rate tier, and that tier's cents per foot.
    pub run_rate_cents_by_amps: Vec<(u16, u32)>,
    pub panel_block_size: u32,
    pub panel_block_rate: u32,
    pub max_run_length_feet: u32,
    pub max_panel_spaces: u32,
    pub add_ons: Vec<AddOnItem>,
}

impl PricingCatalog {
    pub fn standard() -> Self {
        Self {
            labor_by_amps: vec![
                (100, 1_650),
                (125, 1_900),
                (150, 2_150),
                (200, 2_450),
                (400, 4_200),
            ],
            run_rate_cents_by_amps: vec![(150, 750), (200, 875), (400, 1_250)],
            panel_block_size: 8,
            panel_block_rate: 185,
            max_run_length_feet: 300,
            max_panel_spaces: 60,
            add_ons: vec![
                AddOnItem {
                    key: "surge_protection",
                    label: "Whole-home surge protection",
                    cost: 395,
                },
                AddOnItem {
                    key: GENERATOR_INLET,
                    label: "Generator inlet + interlock",
                    cost: 650,
                },
                AddOnItem {
                    key: EV_READY,
                    label: "EV-ready 240V circuit",
                    cost: 725,
                },
                AddOnItem {
                    key: "smart_load_monitoring",
                    label: "Smart load monitoring",
                    cost: 340,
                },
            ],
        }
    }

    pub fn labor_for(&self, amps: u16) -> Option<u32> {
        self.labor_by_amps
            .iter()
            .find(|(size, _)| *size == amps)
            .map(|(_, labor)| *labor)
    }

    pub fn run_rate_cents_for(&self, amps: u16) -> Option<u32> {
        self.run_rate_cents_by_amps
            .iter()
            .find(|(ceiling, _)| amps <= *ceiling)
            .map(|(_, rate)| *rate)
    }

    pub fn add_on(&self, key: &str) -> Option<&AddOnItem> {
        self.add_ons.iter().find(|item| item.key == key)
    }

    pub fn supported_amps(&self) -> Vec<u16> {
        self.labor_by_amps.iter().map(|(amps, _)| *amps).collect()
    }
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
