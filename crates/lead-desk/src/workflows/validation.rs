use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static ZIP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{5})(?:-\d{4})?$").expect("zip pattern compiles"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-level detail for malformed or out-of-range input. Requests carrying any of these
/// are rejected before any engine runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request")?;
        for (index, error) in self.errors.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{} {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// True for a five-digit postal code, optionally followed by a `-NNNN` extension.
pub(crate) fn is_well_formed_zip(raw: &str) -> bool {
    normalize_zip(raw).is_some()
}

/// Reduce a postal code to its five-digit prefix.
pub(crate) fn normalize_zip(raw: &str) -> Option<&str> {
    ZIP_PATTERN
        .captures(raw.trim())
        .and_then(|caps| caps.get(1))
        .map(|head| head.as_str())
}

/// Loose shape check: one `@`, no whitespace, a dot in the domain.
pub(crate) fn is_plausible_email(raw: &str) -> bool {
    EMAIL_PATTERN.is_match(raw.trim())
}
