#![deny(unsafe_code)]

//! Descriptive statistics over a loaded knowledge base.

use std::collections::BTreeMap;

use labref_model::SourceId;
use labref_model::text::non_blank;
use serde::Serialize;

use crate::registry::{KbCounts, KnowledgeBase};

const UNKNOWN_LABEL: &str = "Unknown";
const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KbStats {
    pub totals: KbCounts,
    pub avg_synonyms_per_test: f64,
    pub tests_with_loinc: usize,
    /// Share of tests carrying a LOINC code, in percent.
    pub loinc_coverage_pct: f64,
    pub tests_by_category: Vec<LabelCount>,
    /// Largest panels only.
    pub tests_by_panel: Vec<LabelCount>,
    pub tests_by_specimen: Vec<LabelCount>,
    pub sources_by_type: Vec<LabelCount>,
    pub ranges_by_sex: Vec<LabelCount>,
    /// Sources contributing the most reference ranges.
    pub top_sources: Vec<LabelCount>,
}

impl KbStats {
    pub fn compute(kb: &KnowledgeBase) -> Self {
        let totals = kb.counts();

        let avg_synonyms_per_test = ratio(totals.synonyms, totals.tests);
        let tests_with_loinc = kb
            .tests()
            .filter(|test| non_blank(test.loinc_code.as_deref()).is_some())
            .count();
        let loinc_coverage_pct = ratio(tests_with_loinc, totals.tests) * 100.0;

        let tests_by_category = tally(kb.tests().map(|test| test.category.as_deref()));
        let mut tests_by_panel = tally(kb.tests().map(|test| test.panel_name.as_deref()));
        tests_by_panel.truncate(TOP_N);
        let tests_by_specimen = tally(kb.tests().map(|test| test.specimen_type.as_deref()));
        let sources_by_type = tally(kb.sources().map(|source| source.source_type.as_deref()));
        let ranges_by_sex = tally(kb.ranges().map(|range| Some(range.sex.as_str())));

        let mut per_source: BTreeMap<SourceId, usize> = BTreeMap::new();
        for range in kb.ranges() {
            *per_source.entry(range.source_id).or_default() += 1;
        }
        let mut top_sources = sorted(per_source.into_iter().map(|(id, count)| {
            let label = kb
                .source(id)
                .map_or_else(|| id.to_string(), |source| source.name.clone());
            LabelCount { label, count }
        }));
        top_sources.truncate(TOP_N);

        Self {
            totals,
            avg_synonyms_per_test,
            tests_with_loinc,
            loinc_coverage_pct,
            tests_by_category,
            tests_by_panel,
            tests_by_specimen,
            sources_by_type,
            ranges_by_sex,
            top_sources,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn tally<'a>(labels: impl Iterator<Item = Option<&'a str>>) -> Vec<LabelCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(non_blank(label).unwrap_or(UNKNOWN_LABEL)).or_default() += 1;
    }
    sorted(counts.into_iter().map(|(label, count)| LabelCount {
        label: label.to_string(),
        count,
    }))
}

fn sorted(rows: impl Iterator<Item = LabelCount>) -> Vec<LabelCount> {
    let mut rows: Vec<LabelCount> = rows.collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}
