//! Per-request analysis output.
//!
//! These records are built fresh for every analysis and never persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{Classification, ConfidenceLevel, MatchTier, RangeFilter, ValueKind};
use crate::ids::{RangeId, TestId};
use crate::observation::Observation;

/// A recoverable per-observation problem.
///
/// Issues are recorded on the result instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionIssue {
    #[error("'{raw_name}' does not match any known test")]
    TestNotFound { raw_name: String },
    #[error("no reference range is recorded for test {test_id}")]
    RangeNotFound { test_id: TestId },
    #[error("value '{value}' cannot be compared with a {expected} reference range")]
    MalformedValue { value: String, expected: ValueKind },
}

/// Classified, scored outcome for a single observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    pub observation: Observation,
    pub test_id: Option<TestId>,
    pub canonical_name: Option<String>,
    pub panel_name: Option<String>,
    pub match_tier: MatchTier,
    pub range_id: Option<RangeId>,
    /// Human-readable reference range, "N/A" when none applies.
    pub reference_range: String,
    pub source_name: Option<String>,
    pub trust_level: Option<u8>,
    pub source_priority: Option<u8>,
    /// Range filters skipped because they would have left no candidate.
    pub loosened_filters: Vec<RangeFilter>,
    pub classification: Classification,
    /// Per-test quality score in [0, 1], absent when unmatched.
    pub quality_score: Option<f64>,
    /// True when both a test and a reference range were resolved.
    pub matched: bool,
    /// Observed unit and reference unit spell different units.
    pub unit_mismatch: bool,
    pub issue: Option<ResolutionIssue>,
    /// Closest known test name, offered for unmatched names only.
    pub suggestion: Option<String>,
}

impl ClassifiedResult {
    pub fn is_malformed(&self) -> bool {
        matches!(self.issue, Some(ResolutionIssue::MalformedValue { .. }))
    }
}

/// Aggregate confidence for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateConfidence {
    /// Always within [0.20, 1.0].
    pub aggregate_confidence: f64,
    pub match_rate: f64,
    pub matched_count: usize,
    pub total_count: usize,
    /// Mean quality over matched results, 0 when none matched.
    pub average_quality: f64,
    pub level: ConfidenceLevel,
    /// Where the confidence comes from, e.g. "Knowledge Base (3/4 tests matched)".
    pub source: String,
}

/// Result counts by classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub low: usize,
    pub normal: usize,
    pub high: usize,
    pub unknown: usize,
    /// Results whose value did not fit the range kind (also counted as unknown).
    pub malformed: usize,
}

impl ClassificationCounts {
    pub fn from_results(results: &[ClassifiedResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            counts.record(result.classification);
            if result.is_malformed() {
                counts.malformed += 1;
            }
        }
        counts
    }

    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Low => self.low += 1,
            Classification::Normal => self.normal += 1,
            Classification::High => self.high += 1,
            Classification::Unknown => self.unknown += 1,
        }
    }

    /// Results flagged outside their reference range.
    pub fn abnormal(&self) -> usize {
        self.low + self.high
    }
}

/// Complete response for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// One entry per observation, in input order.
    pub results: Vec<ClassifiedResult>,
    pub confidence: AggregateConfidence,
    pub counts: ClassificationCounts,
}

impl AnalysisReport {
    pub fn unmatched(&self) -> impl Iterator<Item = &ClassifiedResult> {
        self.results.iter().filter(|result| !result.matched)
    }
}
