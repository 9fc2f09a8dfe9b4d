#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use labref_model::{RangeId, ReferenceRange, Source, SourceId, Synonym, Test, TestId};
use tracing::{debug, info};

use crate::error::KbError;
use crate::integrity::IntegrityReport;
use crate::snapshot::KbSnapshot;

/// Record counts of a loaded knowledge base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct KbCounts {
    pub tests: usize,
    pub sources: usize,
    pub ranges: usize,
    pub synonyms: usize,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadSummary {
    pub path: PathBuf,
    pub sha256: String,
    pub counts: KbCounts,
}

/// Immutable arena of knowledge-base records keyed by id.
///
/// Ranges and synonyms refer to tests and sources by id; every id they hold
/// is guaranteed to resolve because construction rejects dangling references.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    tests: BTreeMap<TestId, Test>,
    sources: BTreeMap<SourceId, Source>,
    ranges: BTreeMap<RangeId, ReferenceRange>,
    synonyms: Vec<Synonym>,
    ranges_by_test: BTreeMap<TestId, Vec<RangeId>>,
    synonyms_by_test: BTreeMap<TestId, Vec<usize>>,
}

impl KnowledgeBase {
    /// Validates a snapshot and builds the arena.
    pub fn from_snapshot(snapshot: KbSnapshot) -> Result<Self, KbError> {
        let report = IntegrityReport::check(&snapshot);
        if !report.is_empty() {
            return Err(KbError::Integrity(report));
        }

        let KbSnapshot {
            tests,
            sources,
            ranges,
            synonyms,
        } = snapshot;

        let tests: BTreeMap<TestId, Test> =
            tests.into_iter().map(|test| (test.test_id, test)).collect();
        let sources: BTreeMap<SourceId, Source> = sources
            .into_iter()
            .map(|source| (source.source_id, source))
            .collect();

        let mut ranges_by_test: BTreeMap<TestId, Vec<RangeId>> = BTreeMap::new();
        let ranges: BTreeMap<RangeId, ReferenceRange> = ranges
            .into_iter()
            .map(|range| {
                ranges_by_test
                    .entry(range.test_id)
                    .or_default()
                    .push(range.range_id);
                (range.range_id, range)
            })
            .collect();
        for ids in ranges_by_test.values_mut() {
            ids.sort_unstable();
        }

        let mut synonyms_by_test: BTreeMap<TestId, Vec<usize>> = BTreeMap::new();
        for (idx, synonym) in synonyms.iter().enumerate() {
            synonyms_by_test
                .entry(synonym.test_id)
                .or_default()
                .push(idx);
        }

        let kb = Self {
            tests,
            sources,
            ranges,
            synonyms,
            ranges_by_test,
            synonyms_by_test,
        };
        debug!(
            tests = kb.tests.len(),
            sources = kb.sources.len(),
            ranges = kb.ranges.len(),
            synonyms = kb.synonyms.len(),
            "knowledge base built"
        );
        Ok(kb)
    }

    pub fn from_json_str(json: &str) -> Result<Self, KbError> {
        Self::from_snapshot(KbSnapshot::from_json_str(json)?)
    }

    /// Reads, fingerprints and validates a snapshot file.
    pub fn load(path: &Path) -> Result<(Self, LoadSummary), KbError> {
        let loaded = KbSnapshot::read(path)?;
        let kb = Self::from_snapshot(loaded.snapshot)?;
        let summary = LoadSummary {
            path: path.to_path_buf(),
            sha256: loaded.sha256,
            counts: kb.counts(),
        };
        info!(
            path = %summary.path.display(),
            sha256 = %summary.sha256,
            tests = summary.counts.tests,
            ranges = summary.counts.ranges,
            "knowledge base loaded"
        );
        Ok((kb, summary))
    }

    pub fn counts(&self) -> KbCounts {
        KbCounts {
            tests: self.tests.len(),
            sources: self.sources.len(),
            ranges: self.ranges.len(),
            synonyms: self.synonyms.len(),
        }
    }

    pub fn test(&self, id: TestId) -> Option<&Test> {
        self.tests.get(&id)
    }

    pub fn source(&self, id: SourceId) -> Option<&Source> {
        self.sources.get(&id)
    }

    /// All candidate ranges of a test, in `range_id` order.
    pub fn ranges_for(&self, test_id: TestId) -> impl Iterator<Item = &ReferenceRange> {
        self.ranges_by_test
            .get(&test_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.ranges.get(id))
    }

    pub fn synonyms_for(&self, test_id: TestId) -> impl Iterator<Item = &Synonym> {
        self.synonyms_by_test
            .get(&test_id)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.synonyms.get(idx))
    }

    /// Tests in `test_id` order.
    pub fn tests(&self) -> impl Iterator<Item = &Test> {
        self.tests.values()
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> {
        self.sources.values()
    }

    pub fn ranges(&self) -> impl Iterator<Item = &ReferenceRange> {
        self.ranges.values()
    }

    /// Synonyms in snapshot order.
    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "tests": [
            {"test_id": 1, "canonical_name": "Hemoglobin", "short_name": "Hgb",
             "panel_name": "Complete Blood Count", "specimen_type": "Blood",
             "category": "Hematology", "loinc_code": "718-7", "description": null}
        ],
        "sources": [
            {"source_id": 1, "name": "WHO", "type": "guideline", "url": null,
             "year": 2011, "trust_level": 5}
        ],
        "ranges": [
            {"range_id": 2, "test_id": 1, "source_id": 1, "unit": "g/dL",
             "value_type": "numeric", "ref_low": 12.0, "ref_high": 15.5, "ref_text": null,
             "sex": "Female", "age_min": null, "age_max": null, "condition": null,
             "source_priority": 1, "effective_year": 2011},
            {"range_id": 1, "test_id": 1, "source_id": 1, "unit": "g/dL",
             "value_type": "numeric", "ref_low": 13.5, "ref_high": 17.5, "ref_text": null,
             "sex": "Male", "age_min": null, "age_max": null, "condition": null,
             "source_priority": 1, "effective_year": 2011}
        ],
        "synonyms": [
            {"synonym_id": 1, "test_id": 1, "synonym": "Hb", "source_id": null}
        ]
    }"#;

    #[test]
    fn builds_arena_with_id_lookups() {
        let kb = KnowledgeBase::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(
            kb.counts(),
            KbCounts {
                tests: 1,
                sources: 1,
                ranges: 2,
                synonyms: 1
            }
        );
        let ranges: Vec<RangeId> = kb.ranges_for(TestId::new(1)).map(|r| r.range_id).collect();
        assert_eq!(ranges, vec![RangeId::new(1), RangeId::new(2)]);
        assert_eq!(kb.synonyms_for(TestId::new(1)).count(), 1);
        assert_eq!(kb.ranges_for(TestId::new(9)).count(), 0);
        assert_eq!(kb.source(SourceId::new(1)).map(|s| s.trust_level), Some(5));
    }

    #[test]
    fn rejects_snapshot_with_violations() {
        let broken = SNAPSHOT.replace(r#""trust_level": 5"#, r#""trust_level": 9"#);
        let err = KnowledgeBase::from_json_str(&broken).unwrap_err();
        let report = err.integrity_report().expect("integrity error");
        assert_eq!(report.len(), 1);
    }
}
