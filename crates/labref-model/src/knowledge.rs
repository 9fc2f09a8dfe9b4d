//! Knowledge-base records.
//!
//! Four tables make up a knowledge base:
//!
//! - **tests**: one row per clinically distinct analyte (`test_id`)
//! - **sources**: provenance of reference data with a 1-5 `trust_level`
//! - **ranges**: candidate reference ranges, each owned by one test and one source
//! - **synonyms**: aliases resolving to a test
//!
//! Field names match the snapshot column names exactly and every nullable
//! column is an `Option`, so a snapshot round-trips without loss.

use serde::{Deserialize, Serialize};

use crate::enums::{Sex, ValueKind, null_as_default};
use crate::ids::{RangeId, SourceId, SynonymId, TestId};
use crate::text::non_blank;

/// Canonical identity of a laboratory analyte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Test {
    pub test_id: TestId,
    pub canonical_name: String,
    pub short_name: Option<String>,
    /// Panel grouping (e.g., "Complete Blood Count").
    pub panel_name: Option<String>,
    pub specimen_type: Option<String>,
    pub category: Option<String>,
    /// External coding (LOINC).
    pub loinc_code: Option<String>,
    pub description: Option<String>,
}

impl Test {
    pub fn short_name(&self) -> Option<&str> {
        non_blank(self.short_name.as_deref())
    }

    pub fn panel_name(&self) -> Option<&str> {
        non_blank(self.panel_name.as_deref())
    }
}

/// Provenance of reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub source_id: SourceId,
    pub name: String,
    /// Type tag (e.g., "guideline", "textbook", "laboratory").
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
    /// Authority of the source, 1 (lowest) to 5 (most authoritative).
    pub trust_level: u8,
}

/// A candidate reference range and the population it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub range_id: RangeId,
    pub test_id: TestId,
    pub source_id: SourceId,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value_type: ValueKind,
    pub ref_low: Option<f64>,
    pub ref_high: Option<f64>,
    /// Textual reference expression (e.g., "Negative").
    pub ref_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sex: Sex,
    /// Minimum age in years, inclusive.
    pub age_min: Option<f64>,
    /// Maximum age in years, inclusive.
    pub age_max: Option<f64>,
    /// Condition tag (e.g., "pregnancy", "fasting").
    pub condition: Option<String>,
    /// Precedence among equally trusted sources, 1 (highest) to 5.
    pub source_priority: u8,
    pub effective_year: Option<i32>,
}

impl ReferenceRange {
    pub fn has_numeric_bound(&self) -> bool {
        self.ref_low.is_some() || self.ref_high.is_some()
    }

    /// Textual reference expression, if present and not blank.
    pub fn text_reference(&self) -> Option<&str> {
        non_blank(self.ref_text.as_deref())
    }

    /// Condition tag, if present and not blank.
    pub fn condition_tag(&self) -> Option<&str> {
        non_blank(self.condition.as_deref())
    }

    pub fn unit(&self) -> Option<&str> {
        non_blank(self.unit.as_deref())
    }

    /// Inclusive age containment; a missing bound is open on that side.
    pub fn contains_age(&self, age: f64) -> bool {
        self.age_min.is_none_or(|min| age >= min) && self.age_max.is_none_or(|max| age <= max)
    }

    /// Human-readable form of the range (e.g., "13 - 17 g/dL").
    pub fn display_range(&self) -> String {
        let unit = self.unit().unwrap_or_default();
        let numeric = match (self.value_type, self.ref_low, self.ref_high) {
            (ValueKind::Numeric, Some(low), Some(high)) => Some(format!("{low} - {high}")),
            (ValueKind::Numeric, Some(low), None) => Some(format!(">= {low}")),
            (ValueKind::Numeric, None, Some(high)) => Some(format!("<= {high}")),
            _ => None,
        };
        match numeric {
            Some(bounds) if unit.is_empty() => bounds,
            Some(bounds) => format!("{bounds} {unit}"),
            None => self
                .text_reference()
                .map_or_else(|| "N/A".to_string(), str::to_string),
        }
    }
}

/// Alias mapping a free-text name to a test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synonym {
    pub synonym_id: SynonymId,
    pub test_id: TestId,
    pub synonym: String,
    /// Source the alias was taken from, when recorded.
    pub source_id: Option<SourceId>,
}
