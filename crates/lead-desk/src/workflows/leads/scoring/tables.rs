use std::collections::HashMap;

use regex::Regex;

/// Median household income by five-digit zip for the service area.
const ZIP_MEDIAN_INCOME: &[(&str, u32)] = &[
    ("78613", 112_000),
    ("78628", 104_000),
    ("78660", 91_000),
    ("78664", 86_000),
    ("78681", 110_000),
    ("78701", 98_000),
    ("78703", 162_000),
    ("78704", 92_000),
    ("78705", 38_000),
    ("78717", 131_000),
    ("78726", 128_000),
    ("78730", 175_000),
    ("78731", 152_000),
    ("78732", 168_000),
    ("78733", 171_000),
    ("78735", 140_000),
    ("78738", 158_000),
    ("78739", 149_000),
    ("78745", 72_000),
    ("78746", 205_000),
    ("78748", 95_000),
    ("78749", 118_000),
    ("78750", 126_000),
    ("78759", 108_000),
];

const HIGH_VALUE_KEYWORDS: &[&str] = &[
    "panel",
    "service upgrade",
    "subpanel",
    "generator",
    "ev",
    "ev charger",
    "remodel",
    "commercial",
    "new construction",
    "rewire",
    "pool",
    "hot tub",
    "solar",
    "heavy up",
];

const MID_VALUE_KEYWORDS: &[&str] = &[
    "lighting",
    "outlet",
    "diagnostic",
    "inspection",
    "switch",
    "fixture",
    "ceiling fan",
    "gfci",
    "breaker",
    "troubleshoot",
];

/// Static reference data consulted by the scoring engine. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct ScoringTables {
    pub(crate) zip_income: HashMap<String, u32>,
    pub(crate) high_value_keywords: Vec<KeywordPattern>,
    pub(crate) mid_value_keywords: Vec<KeywordPattern>,
}

/// Keyword compiled once into a word-anchored, case-insensitive pattern.
#[derive(Debug, Clone)]
pub(crate) struct KeywordPattern {
    pub(crate) keyword: String,
    pattern: Regex,
}

impl KeywordPattern {
    /// Short keywords (e.g. "ev") must end on a word boundary too, so they do not fire
    /// inside longer words. Longer ones match as prefixes ("panel" in "panels").
    pub(crate) fn new(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return None;
        }
        let tail = if keyword.chars().count() < 4 { r"\b" } else { "" };
        let pattern = Regex::new(&format!(r"(?i)\b{}{tail}", regex::escape(&keyword))).ok()?;
        Some(Self { keyword, pattern })
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

fn compile(keywords: &[&str]) -> Vec<KeywordPattern> {
    keywords.iter().filter_map(|keyword| KeywordPattern::new(keyword)).collect()
}

impl ScoringTables {
    pub fn standard() -> Self {
        Self {
            zip_income: ZIP_MEDIAN_INCOME
                .iter()
                .map(|(zip, income)| (zip.to_string(), *income))
                .collect(),
            high_value_keywords: compile(HIGH_VALUE_KEYWORDS),
            mid_value_keywords: compile(MID_VALUE_KEYWORDS),
        }
    }

    pub fn with_zip_income(mut self, zip: impl Into<String>, income: u32) -> Self {
        self.zip_income.insert(zip.into(), income);
        self
    }

    pub fn median_income(&self, zip: &str) -> Option<u32> {
        self.zip_income.get(zip).copied()
    }
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self::standard()
    }
}
