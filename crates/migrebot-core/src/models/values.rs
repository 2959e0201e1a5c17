//! Enumerated value tokens shared by entries and medications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Minimum similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Categorical pain level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PainLevel {
    None,
    Mild,
    Moderate,
    Severe,
    VerySevere,
}

impl PainLevel {
    pub const ALL: [PainLevel; 5] = [
        PainLevel::None,
        PainLevel::Mild,
        PainLevel::Moderate,
        PainLevel::Severe,
        PainLevel::VerySevere,
    ];

    /// Stable token used in storage and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PainLevel::None => "none",
            PainLevel::Mild => "mild",
            PainLevel::Moderate => "moderate",
            PainLevel::Severe => "severe",
            PainLevel::VerySevere => "very_severe",
        }
    }

    /// Comma separated list of accepted tokens.
    pub fn accepted() -> String {
        Self::ALL.map(|level| level.as_str()).join(", ")
    }
}

impl fmt::Display for PainLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PainLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = Self::ALL.map(|level| level.as_str());
        let index = parse_choice("pain_level", s, &tokens)?;
        Ok(Self::ALL[index])
    }
}

/// Kind of medication taken.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MedicationType {
    /// Taken regularly to reduce attack frequency
    Preventive,
    /// Taken to stop an attack in progress
    Abortive,
    Other,
}

impl MedicationType {
    pub const ALL: [MedicationType; 3] = [
        MedicationType::Preventive,
        MedicationType::Abortive,
        MedicationType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationType::Preventive => "preventive",
            MedicationType::Abortive => "abortive",
            MedicationType::Other => "other",
        }
    }

    pub fn accepted() -> String {
        Self::ALL.map(|kind| kind.as_str()).join(", ")
    }
}

impl fmt::Display for MedicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = Self::ALL.map(|kind| kind.as_str());
        let index = parse_choice("medication_type", s, &tokens)?;
        Ok(Self::ALL[index])
    }
}

/// Match `value` (trimmed, case-insensitive) against `tokens`, returning the
/// index of the match.
fn parse_choice(
    field: &'static str,
    value: &str,
    tokens: &[&'static str],
) -> Result<usize, ValidationError> {
    let normalized = value.trim().to_lowercase();
    if let Some(index) = tokens.iter().position(|t| *t == normalized) {
        return Ok(index);
    }

    Err(ValidationError::InvalidChoice {
        field,
        value: value.to_string(),
        accepted: tokens.join(", "),
        suggestion: closest_token(&normalized, tokens),
    })
}

/// Best fuzzy match above the suggestion threshold.
fn closest_token(value: &str, tokens: &[&'static str]) -> Option<&'static str> {
    if value.is_empty() {
        return None;
    }

    tokens
        .iter()
        .map(|t| (*t, strsim::jaro_winkler(value, t)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(t, _)| t)
}
