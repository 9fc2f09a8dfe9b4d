//! Deterministic comparison of an observed value with a reference range.

use labref_model::text::eq_ignore_case_trimmed;
use labref_model::{Classification, ObservedValue, ReferenceRange, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub classification: Classification,
    /// The value cannot be compared with the range kind (e.g., text against numeric bounds).
    pub malformed: bool,
}

impl ClassifyOutcome {
    fn of(classification: Classification) -> Self {
        Self {
            classification,
            malformed: false,
        }
    }

    fn malformed() -> Self {
        Self {
            classification: Classification::Unknown,
            malformed: true,
        }
    }
}

pub fn classify(value: &ObservedValue, range: Option<&ReferenceRange>) -> Classification {
    classify_detailed(value, range).classification
}

/// Classifies a value, also reporting whether it was malformed for the range.
///
/// Numeric bounds are inclusive and a missing bound is unbounded. Textual
/// references match on trimmed, case-insensitive equality.
pub fn classify_detailed(value: &ObservedValue, range: Option<&ReferenceRange>) -> ClassifyOutcome {
    let Some(range) = range else {
        return ClassifyOutcome::of(Classification::Unknown);
    };

    match range.value_type {
        ValueKind::Numeric => {
            let Some(number) = value.as_number() else {
                return ClassifyOutcome::malformed();
            };
            if range.ref_low.is_some_and(|low| number < low) {
                ClassifyOutcome::of(Classification::Low)
            } else if range.ref_high.is_some_and(|high| number > high) {
                ClassifyOutcome::of(Classification::High)
            } else {
                ClassifyOutcome::of(Classification::Normal)
            }
        }
        ValueKind::Textual => {
            let observed = value.to_string();
            match range.text_reference() {
                Some(reference) if eq_ignore_case_trimmed(&observed, reference) => {
                    ClassifyOutcome::of(Classification::Normal)
                }
                _ => ClassifyOutcome::of(Classification::Unknown),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labref_model::{RangeId, Sex, SourceId, TestId};

    fn numeric(low: Option<f64>, high: Option<f64>) -> ReferenceRange {
        ReferenceRange {
            range_id: RangeId::new(1),
            test_id: TestId::new(1),
            source_id: SourceId::new(1),
            unit: Some("g/dL".to_string()),
            value_type: ValueKind::Numeric,
            ref_low: low,
            ref_high: high,
            ref_text: None,
            sex: Sex::Any,
            age_min: None,
            age_max: None,
            condition: None,
            source_priority: 1,
            effective_year: None,
        }
    }

    fn textual(text: &str) -> ReferenceRange {
        ReferenceRange {
            value_type: ValueKind::Textual,
            ref_low: None,
            ref_high: None,
            ref_text: Some(text.to_string()),
            unit: None,
            ..numeric(None, None)
        }
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let range = numeric(Some(13.0), Some(17.0));
        assert_eq!(classify(&11.2.into(), Some(&range)), Classification::Low);
        assert_eq!(classify(&13.0.into(), Some(&range)), Classification::Normal);
        assert_eq!(classify(&17.0.into(), Some(&range)), Classification::Normal);
        assert_eq!(classify(&17.01.into(), Some(&range)), Classification::High);
    }

    #[test]
    fn missing_bound_is_unbounded() {
        let upper_only = numeric(None, Some(5.7));
        assert_eq!(classify(&0.0.into(), Some(&upper_only)), Classification::Normal);
        assert_eq!(classify(&6.1.into(), Some(&upper_only)), Classification::High);
        let lower_only = numeric(Some(60.0), None);
        assert_eq!(classify(&1e6.into(), Some(&lower_only)), Classification::Normal);
    }

    #[test]
    fn numeric_text_is_compared_as_a_number() {
        let range = numeric(Some(13.5), Some(17.5));
        assert_eq!(classify(&" 14.5 ".into(), Some(&range)), Classification::Normal);
    }

    #[test]
    fn non_numeric_value_against_numeric_range_is_malformed() {
        let range = numeric(Some(13.5), Some(17.5));
        let outcome = classify_detailed(&"trace".into(), Some(&range));
        assert_eq!(outcome.classification, Classification::Unknown);
        assert!(outcome.malformed);
        assert!(classify_detailed(&f64::INFINITY.into(), Some(&range)).malformed);
    }

    #[test]
    fn textual_reference_matches_case_insensitively() {
        let range = textual("Negative");
        assert_eq!(classify(&" NEGATIVE".into(), Some(&range)), Classification::Normal);
        let outcome = classify_detailed(&"Positive".into(), Some(&range));
        assert_eq!(outcome, ClassifyOutcome::of(Classification::Unknown));
    }

    #[test]
    fn no_range_is_unknown() {
        let outcome = classify_detailed(&14.0.into(), None);
        assert_eq!(outcome.classification, Classification::Unknown);
        assert!(!outcome.malformed);
    }
}
