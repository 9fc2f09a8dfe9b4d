#![allow(missing_docs)]

use labref_model::{
    Observation, ObservedValue, ReferenceRange, Sex, Synonym, Test, TestId, ValueKind,
};

#[test]
fn test_row_with_missing_optional_columns() {
    let test: Test = serde_json::from_str(
        r#"{"test_id": 12, "canonical_name": "Hemoglobin A1c", "short_name": "HbA1c"}"#,
    )
    .expect("parse test row");
    assert_eq!(test.test_id, TestId::new(12));
    assert_eq!(test.short_name(), Some("HbA1c"));
    assert_eq!(test.panel_name(), None);
    assert!(test.loinc_code.is_none());
}

#[test]
fn textual_range_row() {
    let range: ReferenceRange = serde_json::from_str(
        r#"{
            "range_id": 40, "test_id": 7, "source_id": 1, "unit": null,
            "value_type": "textual", "ref_low": null, "ref_high": null,
            "ref_text": "Negative", "sex": "Any", "age_min": null, "age_max": null,
            "condition": "", "source_priority": 1, "effective_year": null
        }"#,
    )
    .expect("parse range row");
    assert_eq!(range.value_type, ValueKind::Textual);
    assert!(!range.has_numeric_bound());
    assert_eq!(range.text_reference(), Some("Negative"));
    assert_eq!(range.condition_tag(), None);
    assert_eq!(range.display_range(), "Negative");
}

#[test]
fn sex_specific_range_row_serializes_canonically() {
    let range: ReferenceRange = serde_json::from_str(
        r#"{
            "range_id": 2, "test_id": 1, "source_id": 1, "unit": "g/dL",
            "value_type": "numeric", "ref_low": 13.5, "ref_high": 17.5,
            "ref_text": null, "sex": "M", "age_min": 18, "age_max": null,
            "condition": null, "source_priority": 2, "effective_year": 2019
        }"#,
    )
    .expect("parse range row");
    assert_eq!(range.sex, Sex::Male);
    let value = serde_json::to_value(&range).expect("serialize range");
    assert_eq!(value["sex"], "Male");
    assert_eq!(value["value_type"], "numeric");
    assert!(value["condition"].is_null());
}

#[test]
fn synonym_source_is_nullable() {
    let synonym: Synonym = serde_json::from_str(
        r#"{"synonym_id": 1, "test_id": 12, "synonym": "A1c", "source_id": null}"#,
    )
    .expect("parse synonym row");
    assert!(synonym.source_id.is_none());
}

#[test]
fn observation_list_preserves_order() {
    let observations: Vec<Observation> = serde_json::from_str(
        r#"[
            {"raw_test_name": "WBC", "value": 7.1, "unit": "x10^9/L"},
            {"raw_test_name": "Urine Glucose", "value": "Negative", "unit": ""},
            {"raw_test_name": "Hemoglobin", "value": 11, "unit": "g/dL", "subject_age": 34}
        ]"#,
    )
    .expect("parse observations");
    let names: Vec<&str> = observations
        .iter()
        .map(|o| o.raw_test_name.as_str())
        .collect();
    assert_eq!(names, ["WBC", "Urine Glucose", "Hemoglobin"]);
    assert_eq!(observations[2].value, ObservedValue::Numeric(11.0));
    assert_eq!(observations[2].subject_age, Some(34.0));
}
