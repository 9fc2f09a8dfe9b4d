//! End-to-end resolution of an observation batch.

use std::sync::Arc;

use labref_kb::KnowledgeBase;
use labref_map::NameIndex;
use labref_model::units::units_conflict;
use labref_model::{
    AnalysisReport, ClassificationCounts, ClassifiedResult, Observation, ResolutionIssue,
};
use rand::Rng;
use tracing::{debug, info, info_span, warn};

use crate::classify::classify_detailed;
use crate::options::AnalysisOptions;
use crate::range::RangeResolver;
use crate::score::{ConfidenceScorer, ResolvedMatch};

/// Shared, immutable analysis engine over one knowledge base.
///
/// The name index is built once here; `analyze` only reads. Clone the
/// `Arc` to share an analyzer between threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    kb: Arc<KnowledgeBase>,
    index: NameIndex,
    options: AnalysisOptions,
}

impl Analyzer {
    pub fn new(kb: Arc<KnowledgeBase>, options: AnalysisOptions) -> Self {
        let index = NameIndex::build(&kb);
        Self { kb, index, options }
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Resolves, classifies and scores every observation, preserving order.
    pub fn analyze<R: Rng>(&self, observations: &[Observation], rng: &mut R) -> AnalysisReport {
        let span = info_span!("analyze", observations = observations.len());
        let _guard = span.enter();

        let resolver = RangeResolver::new(&self.kb);
        let matches: Vec<ResolvedMatch<'_>> = observations
            .iter()
            .map(|observation| self.resolve(observation, &resolver))
            .collect();

        let card = ConfidenceScorer::from_options(&self.options).score(&matches, rng);

        let results: Vec<ClassifiedResult> = observations
            .iter()
            .zip(&matches)
            .zip(&card.per_test)
            .map(|((observation, resolved), quality)| {
                self.build_result(observation, resolved, *quality)
            })
            .collect();
        let counts = ClassificationCounts::from_results(&results);

        info!(
            total = card.aggregate.total_count,
            matched = card.aggregate.matched_count,
            aggregate = card.aggregate.aggregate_confidence,
            level = %card.aggregate.level,
            "analysis complete"
        );

        AnalysisReport {
            results,
            confidence: card.aggregate,
            counts,
        }
    }

    fn resolve<'a>(
        &'a self,
        observation: &Observation,
        resolver: &RangeResolver<'a>,
    ) -> ResolvedMatch<'a> {
        let name = self.index.resolve(&observation.raw_test_name);
        let Some(test) = name.test_id.and_then(|id| self.kb.test(id)) else {
            warn!(
                raw_name = %observation.raw_test_name,
                "test name not found in knowledge base"
            );
            return ResolvedMatch::unmatched();
        };
        let subject = observation.subject().or(&self.options.default_subject);
        let selection = resolver.resolve(test.test_id, &subject);
        debug!(
            raw_name = %observation.raw_test_name,
            test_id = %test.test_id,
            tier = %name.tier,
            range_id = ?selection.as_ref().map(|s| s.range.range_id.get()),
            "observation resolved"
        );
        ResolvedMatch {
            test: Some(test),
            tier: name.tier,
            selection,
        }
    }

    fn build_result(
        &self,
        observation: &Observation,
        resolved: &ResolvedMatch<'_>,
        quality_score: Option<f64>,
    ) -> ClassifiedResult {
        let range = resolved.selection.as_ref().map(|selection| selection.range);
        let outcome = classify_detailed(&observation.value, range);

        let issue = match (resolved.test, range) {
            (None, _) => Some(ResolutionIssue::TestNotFound {
                raw_name: observation.raw_test_name.clone(),
            }),
            (Some(test), None) => Some(ResolutionIssue::RangeNotFound {
                test_id: test.test_id,
            }),
            (Some(_), Some(range)) if outcome.malformed => Some(ResolutionIssue::MalformedValue {
                value: observation.value.to_string(),
                expected: range.value_type,
            }),
            _ => None,
        };

        let unit_mismatch = range.is_some_and(|range| units_conflict(&observation.unit, range.unit()));
        if unit_mismatch {
            warn!(
                raw_name = %observation.raw_test_name,
                observed = %observation.unit,
                reference = range.and_then(|range| range.unit()).unwrap_or_default(),
                "observed unit differs from reference range unit"
            );
        }

        let suggestion = if resolved.test.is_none() && self.options.suggest_unmatched {
            self.index
                .suggest(
                    &observation.raw_test_name,
                    1,
                    self.options.suggestion_min_score,
                )
                .into_iter()
                .next()
                .map(|suggestion| suggestion.canonical_name)
        } else {
            None
        };

        let selection = resolved.selection.as_ref();
        ClassifiedResult {
            observation: observation.clone(),
            test_id: resolved.test.map(|test| test.test_id),
            canonical_name: resolved.test.map(|test| test.canonical_name.clone()),
            panel_name: resolved
                .test
                .and_then(|test| test.panel_name())
                .map(str::to_string),
            match_tier: resolved.tier,
            range_id: range.map(|range| range.range_id),
            reference_range: range.map_or_else(|| "N/A".to_string(), |range| range.display_range()),
            source_name: selection.map(|selection| selection.source.name.clone()),
            trust_level: selection.map(|selection| selection.source.trust_level),
            source_priority: range.map(|range| range.source_priority),
            loosened_filters: selection
                .map(|selection| selection.loosened.clone())
                .unwrap_or_default(),
            classification: outcome.classification,
            quality_score,
            matched: resolved.is_matched(),
            unit_mismatch,
            issue,
            suggestion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn analyzer_is_shareable_across_threads() {
        assert_send_sync::<Analyzer>();
        assert_send_sync::<KnowledgeBase>();
        assert_send_sync::<NameIndex>();
    }

    #[test]
    fn empty_knowledge_base_leaves_everything_unmatched() {
        let analyzer = Analyzer::new(Arc::new(KnowledgeBase::default()), AnalysisOptions::default());
        let mut rng = rand::thread_rng();
        let report = analyzer.analyze(&[Observation::new("Hemoglobin", 11.2, "g/dL")], &mut rng);
        assert_eq!(report.results.len(), 1);
        assert!(!report.results[0].matched);
        assert_eq!(report.confidence.aggregate_confidence, 0.20);
    }
}
