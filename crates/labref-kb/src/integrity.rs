#![deny(unsafe_code)]

//! Load-time consistency checks over a snapshot.
//!
//! Every violation is collected rather than stopping at the first one, so an
//! operator sees the full list in a single run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use labref_model::text::normalize_name;
use labref_model::{RangeId, SourceId, SynonymId, TestId, ValueKind};

use crate::snapshot::KbSnapshot;

const TRUST_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
const PRIORITY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntegrityViolation {
    #[error("duplicate test_id {0}")]
    DuplicateTestId(TestId),
    #[error("duplicate source_id {0}")]
    DuplicateSourceId(SourceId),
    #[error("duplicate range_id {0}")]
    DuplicateRangeId(RangeId),
    #[error("duplicate synonym_id {0}")]
    DuplicateSynonymId(SynonymId),
    #[error("test {0} has a blank canonical name")]
    BlankCanonicalName(TestId),
    #[error("canonical name '{name}' is shared by tests {first} and {second}")]
    DuplicateCanonicalName {
        name: String,
        first: TestId,
        second: TestId,
    },
    #[error("source {source_id} has trust_level {value}, expected 1-5")]
    TrustLevelOutOfRange { source_id: SourceId, value: u8 },
    #[error("range {range_id} has source_priority {value}, expected 1-5")]
    PriorityOutOfRange { range_id: RangeId, value: u8 },
    #[error("range {range_id} references missing test {test_id}")]
    RangeUnknownTest { range_id: RangeId, test_id: TestId },
    #[error("range {range_id} references missing source {source_id}")]
    RangeUnknownSource {
        range_id: RangeId,
        source_id: SourceId,
    },
    #[error("numeric range {0} has neither ref_low nor ref_high")]
    EmptyNumericBounds(RangeId),
    #[error("textual range {0} has no ref_text")]
    MissingTextReference(RangeId),
    #[error("range {range_id} has ref_low {low} above ref_high {high}")]
    InvertedBounds { range_id: RangeId, low: f64, high: f64 },
    #[error("range {range_id} has age_min {min} above age_max {max}")]
    InvertedAgeBounds { range_id: RangeId, min: f64, max: f64 },
    #[error("synonym {synonym_id} references missing test {test_id}")]
    SynonymUnknownTest {
        synonym_id: SynonymId,
        test_id: TestId,
    },
    #[error("synonym {synonym_id} references missing source {source_id}")]
    SynonymUnknownSource {
        synonym_id: SynonymId,
        source_id: SourceId,
    },
    #[error("synonym {0} is blank")]
    BlankSynonym(SynonymId),
    #[error("alias '{alias}' maps to more than one test: {}", join_ids(.test_ids))]
    AmbiguousSynonym { alias: String, test_ids: Vec<TestId> },
}

fn join_ids(ids: &[TestId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    /// Checks a snapshot and returns every violation found.
    pub fn check(snapshot: &KbSnapshot) -> Self {
        let mut report = Self::default();
        let tests = report.check_tests(snapshot);
        let sources = report.check_sources(snapshot);
        report.check_ranges(snapshot, &tests, &sources);
        report.check_synonyms(snapshot, &tests, &sources);
        report
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, violation: IntegrityViolation) {
        self.violations.push(violation);
    }

    fn check_tests(&mut self, snapshot: &KbSnapshot) -> BTreeSet<TestId> {
        let mut ids = BTreeSet::new();
        let mut names: BTreeMap<String, TestId> = BTreeMap::new();
        for test in &snapshot.tests {
            if !ids.insert(test.test_id) {
                self.push(IntegrityViolation::DuplicateTestId(test.test_id));
            }
            let key = normalize_name(&test.canonical_name);
            if key.is_empty() {
                self.push(IntegrityViolation::BlankCanonicalName(test.test_id));
                continue;
            }
            match names.get(&key) {
                Some(&first) if first != test.test_id => {
                    self.push(IntegrityViolation::DuplicateCanonicalName {
                        name: test.canonical_name.clone(),
                        first,
                        second: test.test_id,
                    });
                }
                Some(_) => {}
                None => {
                    names.insert(key, test.test_id);
                }
            }
        }
        ids
    }

    fn check_sources(&mut self, snapshot: &KbSnapshot) -> BTreeSet<SourceId> {
        let mut ids = BTreeSet::new();
        for source in &snapshot.sources {
            if !ids.insert(source.source_id) {
                self.push(IntegrityViolation::DuplicateSourceId(source.source_id));
            }
            if !TRUST_RANGE.contains(&source.trust_level) {
                self.push(IntegrityViolation::TrustLevelOutOfRange {
                    source_id: source.source_id,
                    value: source.trust_level,
                });
            }
        }
        ids
    }

    fn check_ranges(
        &mut self,
        snapshot: &KbSnapshot,
        tests: &BTreeSet<TestId>,
        sources: &BTreeSet<SourceId>,
    ) {
        let mut ids = BTreeSet::new();
        for range in &snapshot.ranges {
            let range_id = range.range_id;
            if !ids.insert(range_id) {
                self.push(IntegrityViolation::DuplicateRangeId(range_id));
            }
            if !tests.contains(&range.test_id) {
                self.push(IntegrityViolation::RangeUnknownTest {
                    range_id,
                    test_id: range.test_id,
                });
            }
            if !sources.contains(&range.source_id) {
                self.push(IntegrityViolation::RangeUnknownSource {
                    range_id,
                    source_id: range.source_id,
                });
            }
            if !PRIORITY_RANGE.contains(&range.source_priority) {
                self.push(IntegrityViolation::PriorityOutOfRange {
                    range_id,
                    value: range.source_priority,
                });
            }
            match range.value_type {
                ValueKind::Numeric if !range.has_numeric_bound() => {
                    self.push(IntegrityViolation::EmptyNumericBounds(range_id));
                }
                ValueKind::Textual if range.text_reference().is_none() => {
                    self.push(IntegrityViolation::MissingTextReference(range_id));
                }
                _ => {}
            }
            if let (Some(low), Some(high)) = (range.ref_low, range.ref_high)
                && low > high
            {
                self.push(IntegrityViolation::InvertedBounds {
                    range_id,
                    low,
                    high,
                });
            }
            if let (Some(min), Some(max)) = (range.age_min, range.age_max)
                && min > max
            {
                self.push(IntegrityViolation::InvertedAgeBounds { range_id, min, max });
            }
        }
    }

    fn check_synonyms(
        &mut self,
        snapshot: &KbSnapshot,
        tests: &BTreeSet<TestId>,
        sources: &BTreeSet<SourceId>,
    ) {
        let mut ids = BTreeSet::new();
        let mut aliases: BTreeMap<String, BTreeSet<TestId>> = BTreeMap::new();
        for synonym in &snapshot.synonyms {
            let synonym_id = synonym.synonym_id;
            if !ids.insert(synonym_id) {
                self.push(IntegrityViolation::DuplicateSynonymId(synonym_id));
            }
            if !tests.contains(&synonym.test_id) {
                self.push(IntegrityViolation::SynonymUnknownTest {
                    synonym_id,
                    test_id: synonym.test_id,
                });
            }
            if let Some(source_id) = synonym.source_id
                && !sources.contains(&source_id)
            {
                self.push(IntegrityViolation::SynonymUnknownSource {
                    synonym_id,
                    source_id,
                });
            }
            let key = normalize_name(&synonym.synonym);
            if key.is_empty() {
                self.push(IntegrityViolation::BlankSynonym(synonym_id));
                continue;
            }
            aliases.entry(key).or_default().insert(synonym.test_id);
        }

        for (alias, test_ids) in aliases {
            if test_ids.len() > 1 {
                self.push(IntegrityViolation::AmbiguousSynonym {
                    alias,
                    test_ids: test_ids.into_iter().collect(),
                });
            }
        }
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [] => f.write_str("no integrity violations"),
            [only] => write!(f, "1 integrity violation: {only}"),
            [first, rest @ ..] => write!(
                f,
                "{} integrity violations (first: {first}; {} more)",
                self.violations.len(),
                rest.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_is_clean() {
        let report = IntegrityReport::check(&KbSnapshot::default());
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "no integrity violations");
    }

    #[test]
    fn report_display_summarizes_count() {
        let report = IntegrityReport {
            violations: vec![
                IntegrityViolation::DuplicateTestId(TestId::new(1)),
                IntegrityViolation::BlankSynonym(SynonymId::new(4)),
            ],
        };
        assert_eq!(
            report.to_string(),
            "2 integrity violations (first: duplicate test_id 1; 1 more)"
        );
    }

    #[test]
    fn ambiguous_synonym_lists_test_ids() {
        let violation = IntegrityViolation::AmbiguousSynonym {
            alias: "hb".to_string(),
            test_ids: vec![TestId::new(1), TestId::new(7)],
        };
        assert_eq!(
            violation.to_string(),
            "alias 'hb' maps to more than one test: 1, 7"
        );
    }
}
