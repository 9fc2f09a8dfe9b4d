//! Type-safe enumerations for knowledge-base and result concepts.
//!
//! Snapshot rows carry these as strings; parsing is lenient about case and
//! common abbreviations, serialization always emits the canonical spelling.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Biological sex a reference range applies to.
///
/// `Any` on a range means the range is not sex-specific. On a subject it
/// means the sex is unknown or was not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Any,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Any => "Any",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Sex {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "M" | "MALE" => Ok(Sex::Male),
            "F" | "FEMALE" => Ok(Sex::Female),
            "" | "ANY" | "ALL" | "BOTH" => Ok(Sex::Any),
            _ => Err(ModelError::InvalidSex(s.to_string())),
        }
    }
}

impl TryFrom<String> for Sex {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Sex> for &'static str {
    fn from(value: Sex) -> Self {
        value.as_str()
    }
}

/// Whether a reference range is expressed as numeric bounds or as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ValueKind {
    #[default]
    Numeric,
    Textual,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Numeric => "numeric",
            ValueKind::Textual => "textual",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ValueKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "" | "NUMERIC" | "NUMBER" | "QUANTITATIVE" => Ok(ValueKind::Numeric),
            "TEXTUAL" | "TEXT" | "QUALITATIVE" => Ok(ValueKind::Textual),
            _ => Err(ModelError::InvalidValueKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ValueKind {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueKind> for &'static str {
    fn from(value: ValueKind) -> Self {
        value.as_str()
    }
}

/// Deserialize a nullable column, falling back to the type's default on `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of comparing an observed value with its reference range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Classification {
    Low,
    Normal,
    High,
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Low => "LOW",
            Classification::Normal => "NORMAL",
            Classification::High => "HIGH",
            Classification::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a raw test name was resolved to a canonical test.
///
/// Variants are declared in lookup precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Case-sensitive match on the canonical name.
    ExactCanonical,
    /// Case-sensitive match on the short name.
    ExactShortName,
    /// Match on the normalized canonical or short name.
    Normalized,
    /// Match through the synonym table.
    Synonym,
    Unmatched,
}

impl MatchTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::ExactCanonical => "exact_canonical",
            MatchTier::ExactShortName => "exact_short_name",
            MatchTier::Normalized => "normalized",
            MatchTier::Synonym => "synonym",
            MatchTier::Unmatched => "unmatched",
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchTier::Unmatched)
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of the range applicability cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeFilter {
    Sex,
    Age,
    Condition,
}

impl RangeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeFilter::Sex => "sex",
            RangeFilter::Age => "age",
            RangeFilter::Condition => "condition",
        }
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Banded aggregate confidence for a whole analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::High => "HIGH",
        }
    }

    /// Returns a human-readable description of the confidence level.
    pub fn description(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "most results backed by trusted reference sources",
            ConfidenceLevel::Medium => "partial knowledge-base coverage - review results",
            ConfidenceLevel::Low => "limited knowledge-base coverage - consult a clinician",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
