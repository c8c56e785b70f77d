use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::super::domain::{LeadIntent, ScoreComponent, ScoreFactor};
use super::tables::{KeywordPattern, ScoringTables};
use crate::workflows::validation::normalize_zip;

pub(crate) const BASE_SCORE: u8 = 20;
pub(crate) const MAX_SCORE: u8 = 100;
pub(crate) const TIER_A_THRESHOLD: u8 = 75;
pub(crate) const JOB_SIZE_CAP: u8 = 30;

const MISSING_ZIP_POINTS: u8 = 12;
const UNMAPPED_ZIP_POINTS: u8 = 14;

/// Income floors and the points they earn, highest first.
const INCOME_BANDS: &[(u32, u8)] = &[(150_000, 28), (125_000, 24), (105_000, 20), (90_000, 16)];
const INCOME_FLOOR_POINTS: u8 = 12;

const BUDGET_BANDS: &[(f64, u8)] = &[
    (15_000.0, 25),
    (7_500.0, 18),
    (3_000.0, 12),
    (1_000.0, 8),
];
const BUDGET_FLOOR_POINTS: u8 = 4;

pub(crate) fn zip_income_component(zip: Option<&str>, tables: &ScoringTables) -> ScoreComponent {
    let normalized = zip.and_then(normalize_zip);
    let (points, notes) = match normalized {
        None => (
            MISSING_ZIP_POINTS,
            "no usable zip; default mid score".to_string(),
        ),
        Some(zip) => match tables.median_income(zip) {
            Some(income) => (
                income_points(income),
                format!("zip {zip} median income {income}"),
            ),
            None => (
                UNMAPPED_ZIP_POINTS,
                format!("zip {zip} not in income table"),
            ),
        },
    };

    ScoreComponent {
        factor: ScoreFactor::ZipIncome,
        points,
        notes,
    }
}

pub(crate) fn income_points(income: u32) -> u8 {
    INCOME_BANDS
        .iter()
        .find(|(floor, _)| income >= *floor)
        .map(|(_, points)| *points)
        .unwrap_or(INCOME_FLOOR_POINTS)
}

pub(crate) fn intent_component(intent: LeadIntent) -> ScoreComponent {
    let points = match intent {
        LeadIntent::Book => 28,
        LeadIntent::Estimate => 20,
        LeadIntent::Contact => 16,
    };
    ScoreComponent {
        factor: ScoreFactor::Intent,
        points,
        notes: format!("intent {}", intent.label()),
    }
}

pub(crate) fn job_size_component(
    service_category: &str,
    notes: &str,
    budget_range: &str,
    tables: &ScoringTables,
) -> ScoreComponent {
    let text = format!("{service_category} {notes}").to_lowercase();
    let (keyword_points, keyword_note) = keyword_points(&text, tables);
    let (budget_points, budget_note) = budget_points(budget_range);
    let points = keyword_points.saturating_add(budget_points).min(JOB_SIZE_CAP);

    ScoreComponent {
        factor: ScoreFactor::JobSize,
        points,
        notes: format!("{keyword_note}; {budget_note}"),
    }
}

fn keyword_points(text: &str, tables: &ScoringTables) -> (u8, String) {
    if text.trim().is_empty() {
        return (0, "no job description".to_string());
    }
    if let Some(keyword) = first_match(text, &tables.high_value_keywords) {
        return (22, format!("high-value keyword '{keyword}'"));
    }
    if let Some(keyword) = first_match(text, &tables.mid_value_keywords) {
        return (14, format!("mid-value keyword '{keyword}'"));
    }
    (8, "description without sizing keywords".to_string())
}

fn first_match<'a>(text: &str, keywords: &'a [KeywordPattern]) -> Option<&'a str> {
    keywords
        .iter()
        .find(|keyword| keyword.is_match(text))
        .map(|keyword| keyword.keyword.as_str())
}

#[cfg(test)]
pub(crate) fn contains_phrase(text: &str, phrase: &str) -> bool {
    KeywordPattern::new(phrase).is_some_and(|keyword| keyword.is_match(text))
}

/// Dollar figures inside free text: "$5,000", "$ 8500.50", "$12k".
static DOLLAR_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)(k)?").expect("dollar amount pattern compiles")
});

/// A bare figure that makes up the whole budget field.
static BARE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d[\d,]*(?:\.\d+)?)(k)?$").expect("bare amount pattern compiles")
});

static QUALITATIVE_BUDGETS: Lazy<Vec<(KeywordPattern, u8, &'static str)>> = Lazy::new(|| {
    [
        ("high", 20, "high"),
        ("major", 20, "high"),
        ("medium", 10, "medium"),
        ("mid", 10, "medium"),
        ("small", 5, "small"),
        ("low", 5, "small"),
        ("minor", 5, "small"),
    ]
    .into_iter()
    .filter_map(|(word, points, label)| {
        KeywordPattern::new(word).map(|pattern| (pattern, points, label))
    })
    .collect()
});

fn budget_points(raw: &str) -> (u8, String) {
    if let Some(amount) = parse_budget_amount(raw) {
        let points = BUDGET_BANDS
            .iter()
            .find(|(floor, _)| amount >= *floor)
            .map(|(_, points)| *points)
            .unwrap_or(BUDGET_FLOOR_POINTS);
        return (points, format!("budget ${amount:.0}"));
    }

    let lowered = raw.to_lowercase();
    QUALITATIVE_BUDGETS
        .iter()
        .find(|(pattern, _, _)| pattern.is_match(&lowered))
        .map(|(_, points, label)| (*points, format!("{label} budget")))
        .unwrap_or((0, "budget not stated".to_string()))
}

/// Largest dollar figure in free text such as "$5,000 - $8,500" or "$12k".
/// A bare number ("9000") is accepted when it is the whole string.
pub(crate) fn parse_budget_amount(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    let largest = DOLLAR_AMOUNT
        .captures_iter(&lowered)
        .filter_map(|caps| read_amount(&caps))
        .fold(None, |best: Option<f64>, amount| {
            Some(best.map_or(amount, |current| current.max(amount)))
        });

    largest.or_else(|| {
        BARE_AMOUNT
            .captures(&lowered)
            .and_then(|caps| read_amount(&caps))
    })
}

fn read_amount(caps: &Captures<'_>) -> Option<f64> {
    let digits = caps.get(1)?.as_str().replace(',', "");
    let amount: f64 = digits.parse().ok()?;
    Some(if caps.get(2).is_some() {
        amount * 1_000.0
    } else {
        amount
    })
}
