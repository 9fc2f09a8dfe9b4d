//! Data model for laboratory reference resolution.
//!
//! Knowledge-base records ([`Test`], [`Source`], [`ReferenceRange`],
//! [`Synonym`]) are immutable once loaded. Observations and results are
//! per-request values.

#![deny(unsafe_code)]

pub mod enums;
pub mod error;
pub mod ids;
pub mod knowledge;
pub mod observation;
pub mod result;
pub mod text;
pub mod units;

pub use enums::{Classification, ConfidenceLevel, MatchTier, RangeFilter, Sex, ValueKind};
pub use error::ModelError;
pub use ids::{RangeId, SourceId, SynonymId, TestId};
pub use knowledge::{ReferenceRange, Source, Synonym, Test};
pub use observation::{ObservedValue, Observation, Subject};
pub use result::{
    AggregateConfidence, AnalysisReport, ClassificationCounts, ClassifiedResult, ResolutionIssue,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn result(classification: Classification, issue: Option<ResolutionIssue>) -> ClassifiedResult {
        ClassifiedResult {
            observation: Observation::new("Glucose", 5.4, "mmol/L"),
            test_id: Some(TestId::new(1)),
            canonical_name: Some("Glucose".to_string()),
            panel_name: None,
            match_tier: MatchTier::ExactCanonical,
            range_id: Some(RangeId::new(1)),
            reference_range: "3.9 - 5.5 mmol/L".to_string(),
            source_name: None,
            trust_level: Some(4),
            source_priority: Some(1),
            loosened_filters: vec![],
            classification,
            quality_score: Some(0.85),
            matched: true,
            unit_mismatch: false,
            issue,
            suggestion: None,
        }
    }

    #[test]
    fn classification_counts_tally_results() {
        let results = vec![
            result(Classification::Low, None),
            result(Classification::Normal, None),
            result(Classification::High, None),
            result(
                Classification::Unknown,
                Some(ResolutionIssue::MalformedValue {
                    value: "trace".to_string(),
                    expected: ValueKind::Numeric,
                }),
            ),
        ];
        let counts = ClassificationCounts::from_results(&results);
        assert_eq!(counts.low, 1);
        assert_eq!(counts.normal, 1);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.malformed, 1);
        assert_eq!(counts.abnormal(), 2);
    }

    #[test]
    fn issue_serializes_with_kind_tag() {
        let issue = ResolutionIssue::RangeNotFound {
            test_id: TestId::new(9),
        };
        let json = serde_json::to_value(&issue).expect("serialize issue");
        assert_eq!(json["kind"], "range_not_found");
        assert_eq!(json["test_id"], 9);
        assert_eq!(issue.to_string(), "no reference range is recorded for test 9");
    }

    #[test]
    fn result_round_trips_through_json() {
        let original = result(Classification::Normal, None);
        let json = serde_json::to_string(&original).expect("serialize result");
        let round: ClassifiedResult = serde_json::from_str(&json).expect("deserialize result");
        assert_eq!(round, original);
    }
}
