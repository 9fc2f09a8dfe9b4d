use labref_kb::{IntegrityReport, IntegrityViolation, KbError, KbSnapshot, KnowledgeBase};
use labref_model::{RangeId, SourceId, SynonymId, TestId};

const SAMPLE_KB: &str = include_str!("../../../fixtures/sample_kb.json");

fn sample() -> KbSnapshot {
    KbSnapshot::from_json_str(SAMPLE_KB).unwrap()
}

#[test]
fn sample_snapshot_is_clean() {
    let report = IntegrityReport::check(&sample());
    assert!(report.is_empty(), "{report}");
}

#[test]
fn every_violation_is_collected() {
    let mut snapshot = sample();
    // Duplicate test id and a canonical name that collides after normalization.
    let mut copy = snapshot.tests[0].clone();
    copy.canonical_name = "HEMOGLOBIN ".to_string();
    snapshot.tests.push(copy);
    // Dangling references and bad bounds on one range.
    let range = &mut snapshot.ranges[0];
    range.test_id = TestId::new(99);
    range.source_id = SourceId::new(42);
    range.ref_low = Some(20.0);
    range.source_priority = 0;
    // Alias shared by two tests.
    let mut alias = snapshot.synonyms[0].clone();
    alias.synonym_id = SynonymId::new(100);
    alias.test_id = TestId::new(2);
    alias.synonym = "hb".to_string();
    snapshot.synonyms.push(alias);

    let report = IntegrityReport::check(&snapshot);
    let expected = [
        IntegrityViolation::DuplicateTestId(TestId::new(1)),
        IntegrityViolation::RangeUnknownTest {
            range_id: RangeId::new(1),
            test_id: TestId::new(99),
        },
        IntegrityViolation::RangeUnknownSource {
            range_id: RangeId::new(1),
            source_id: SourceId::new(42),
        },
        IntegrityViolation::PriorityOutOfRange {
            range_id: RangeId::new(1),
            value: 0,
        },
        IntegrityViolation::InvertedBounds {
            range_id: RangeId::new(1),
            low: 20.0,
            high: 15.5,
        },
        IntegrityViolation::AmbiguousSynonym {
            alias: "hb".to_string(),
            test_ids: vec![TestId::new(1), TestId::new(2)],
        },
    ];
    assert_eq!(report.violations, expected);
}

#[test]
fn duplicate_canonical_names_are_compared_normalized() {
    let mut snapshot = sample();
    let mut copy = snapshot.tests[1].clone();
    copy.test_id = TestId::new(50);
    copy.canonical_name = "glucose".to_string();
    snapshot.tests.push(copy);

    let report = IntegrityReport::check(&snapshot);
    assert_eq!(
        report.violations,
        vec![IntegrityViolation::DuplicateCanonicalName {
            name: "glucose".to_string(),
            first: TestId::new(2),
            second: TestId::new(50),
        }]
    );
}

#[test]
fn range_kind_requires_matching_reference() {
    let mut snapshot = sample();
    // Textual urine protein range without text, numeric TSH range without bounds.
    snapshot.ranges[10].ref_text = Some("  ".to_string());
    snapshot.ranges[11].ref_low = None;
    snapshot.ranges[11].ref_high = None;
    snapshot.ranges[12].age_min = Some(65.0);
    snapshot.ranges[12].age_max = Some(18.0);

    let report = IntegrityReport::check(&snapshot);
    assert_eq!(
        report.violations,
        vec![
            IntegrityViolation::MissingTextReference(RangeId::new(11)),
            IntegrityViolation::EmptyNumericBounds(RangeId::new(12)),
            IntegrityViolation::InvertedAgeBounds {
                range_id: RangeId::new(13),
                min: 65.0,
                max: 18.0,
            },
        ]
    );
}

#[test]
fn synonym_source_is_checked_only_when_present() {
    let mut snapshot = sample();
    snapshot.synonyms[1].source_id = Some(SourceId::new(77));
    snapshot.synonyms[2].synonym = " - ".to_string();
    snapshot.sources[0].trust_level = 6;

    let report = IntegrityReport::check(&snapshot);
    assert_eq!(
        report.violations,
        vec![
            IntegrityViolation::TrustLevelOutOfRange {
                source_id: SourceId::new(1),
                value: 6,
            },
            IntegrityViolation::SynonymUnknownSource {
                synonym_id: SynonymId::new(2),
                source_id: SourceId::new(77),
            },
            IntegrityViolation::BlankSynonym(SynonymId::new(3)),
        ]
    );
}

#[test]
fn knowledge_base_refuses_inconsistent_snapshot() {
    let mut snapshot = sample();
    snapshot.tests[0].canonical_name = "   ".to_string();
    let err = KnowledgeBase::from_snapshot(snapshot).unwrap_err();
    assert!(matches!(err, KbError::Integrity(_)));
    assert_eq!(
        err.to_string(),
        "knowledge base rejected: 1 integrity violation: test 1 has a blank canonical name"
    );
}

#[test]
fn load_fingerprints_the_snapshot_file() {
    let path =
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/sample_kb.json");
    let (kb, summary) = KnowledgeBase::load(&path).unwrap();
    assert_eq!(summary.sha256, labref_kb::snapshot::fingerprint(SAMPLE_KB.as_bytes()));
    assert_eq!(summary.counts, kb.counts());
    assert_eq!(summary.counts.ranges, 13);
}

#[test]
fn missing_file_reports_path() {
    let err = KnowledgeBase::load(std::path::Path::new("/nonexistent/kb.json")).unwrap_err();
    assert!(matches!(err, KbError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/kb.json"));
}
