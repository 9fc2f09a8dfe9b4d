//! Per-test quality scores and the bounded aggregate confidence.
//!
//! ```text
//! quality   = clamp(0.6 * (trust - 1) / 4 + 0.4 * (6 - priority) / 5 + jitter, 0, 1)
//! aggregate = clamp(max(0.4 * match_rate + 0.6 * avg_quality, 0.20), 0.20, 1.0)
//! ```
//!
//! Jitter is drawn from the caller's generator, one draw per matched test in
//! input order, so a seeded generator reproduces a run exactly.

use labref_model::{AggregateConfidence, MatchTier, Test};
use rand::Rng;

use crate::options::{AnalysisOptions, ConfidenceThresholds, DEFAULT_JITTER_AMPLITUDE};
use crate::range::RangeSelection;

/// Lowest aggregate confidence ever reported.
pub const CONFIDENCE_FLOOR: f64 = 0.20;

const MAX_JITTER_AMPLITUDE: f64 = 1.0;
const TRUST_WEIGHT: f64 = 0.6;
const PRIORITY_WEIGHT: f64 = 0.4;
const MATCH_RATE_WEIGHT: f64 = 0.4;
const QUALITY_WEIGHT: f64 = 0.6;

/// Name and range resolution for one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch<'a> {
    pub test: Option<&'a Test>,
    pub tier: MatchTier,
    pub selection: Option<RangeSelection<'a>>,
}

impl ResolvedMatch<'_> {
    pub fn unmatched() -> Self {
        Self {
            test: None,
            tier: MatchTier::Unmatched,
            selection: None,
        }
    }

    /// Matched means both a test and one of its ranges were resolved.
    pub fn is_matched(&self) -> bool {
        self.selection.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    /// Quality per input match, `None` where unmatched.
    pub per_test: Vec<Option<f64>>,
    pub aggregate: AggregateConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScorer {
    jitter_amplitude: f64,
    thresholds: ConfidenceThresholds,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_AMPLITUDE, ConfidenceThresholds::default())
    }
}

impl ConfidenceScorer {
    /// A non-finite or negative amplitude disables jitter. Amplitudes above
    /// 1 are capped at 1, where the quality clamp already saturates.
    pub fn new(jitter_amplitude: f64, thresholds: ConfidenceThresholds) -> Self {
        let jitter_amplitude = if jitter_amplitude.is_finite() && jitter_amplitude > 0.0 {
            jitter_amplitude.min(MAX_JITTER_AMPLITUDE)
        } else {
            0.0
        };
        Self {
            jitter_amplitude,
            thresholds,
        }
    }

    pub fn from_options(options: &AnalysisOptions) -> Self {
        Self::new(options.jitter_amplitude, options.thresholds)
    }

    pub fn jitter_amplitude(&self) -> f64 {
        self.jitter_amplitude
    }

    pub fn score<R: Rng>(&self, matches: &[ResolvedMatch<'_>], rng: &mut R) -> ScoreCard {
        let per_test: Vec<Option<f64>> = matches
            .iter()
            .map(|resolved| {
                resolved.selection.as_ref().map(|selection| {
                    let jitter = self.draw_jitter(rng);
                    quality(
                        selection.source.trust_level,
                        selection.range.source_priority,
                        jitter,
                    )
                })
            })
            .collect();
        let aggregate = self.aggregate(&per_test);
        ScoreCard {
            per_test,
            aggregate,
        }
    }

    /// Aggregates per-test qualities; `None` entries count as unmatched.
    pub fn aggregate(&self, per_test: &[Option<f64>]) -> AggregateConfidence {
        let total_count = per_test.len();
        let qualities: Vec<f64> = per_test.iter().flatten().copied().collect();
        let matched_count = qualities.len();

        let (match_rate, average_quality) = if total_count == 0 {
            (0.0, 0.0)
        } else {
            let average = if matched_count == 0 {
                0.0
            } else {
                qualities.iter().sum::<f64>() / matched_count as f64
            };
            (matched_count as f64 / total_count as f64, average)
        };

        let raw = match_rate * MATCH_RATE_WEIGHT + average_quality * QUALITY_WEIGHT;
        let aggregate_confidence = raw.max(CONFIDENCE_FLOOR).clamp(CONFIDENCE_FLOOR, 1.0);

        AggregateConfidence {
            aggregate_confidence,
            match_rate,
            matched_count,
            total_count,
            average_quality,
            level: self.thresholds.categorize(aggregate_confidence),
            source: format!("Knowledge Base ({matched_count}/{total_count} tests matched)"),
        }
    }

    fn draw_jitter<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.jitter_amplitude > 0.0 {
            rng.gen_range(-self.jitter_amplitude..=self.jitter_amplitude)
        } else {
            0.0
        }
    }
}

/// Quality of a range's provenance, before jitter.
pub fn base_quality(trust_level: u8, source_priority: u8) -> f64 {
    let trust_score = (f64::from(trust_level) - 1.0) / 4.0;
    let priority_score = (6.0 - f64::from(source_priority)) / 5.0;
    trust_score * TRUST_WEIGHT + priority_score * PRIORITY_WEIGHT
}

fn quality(trust_level: u8, source_priority: u8, jitter: f64) -> f64 {
    (base_quality(trust_level, source_priority) + jitter).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labref_model::ConfidenceLevel;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn base_quality_spans_unit_interval() {
        assert!(close(base_quality(5, 1), 1.0));
        assert!(close(base_quality(1, 5), 0.08));
        assert!(close(base_quality(5, 3), 0.84));
        assert!(close(base_quality(3, 1), 0.7));
    }

    #[test]
    fn quality_is_clamped_after_jitter() {
        assert_eq!(quality(5, 1, 0.05), 1.0);
        assert_eq!(quality(1, 5, -0.5), 0.0);
    }

    #[test]
    fn aggregate_of_empty_list_is_the_floor() {
        let aggregate = ConfidenceScorer::default().aggregate(&[]);
        assert_eq!(aggregate.aggregate_confidence, CONFIDENCE_FLOOR);
        assert_eq!(aggregate.match_rate, 0.0);
        assert_eq!(aggregate.total_count, 0);
        assert_eq!(aggregate.level, ConfidenceLevel::Low);
    }

    #[test]
    fn aggregate_weights_match_rate_and_quality() {
        let scorer = ConfidenceScorer::default();
        let aggregate = scorer.aggregate(&[Some(1.0), Some(0.5), None, None]);
        assert!(close(aggregate.match_rate, 0.5));
        assert!(close(aggregate.average_quality, 0.75));
        assert!(close(aggregate.aggregate_confidence, 0.65));
        assert_eq!(aggregate.level, ConfidenceLevel::Medium);
        assert_eq!(aggregate.source, "Knowledge Base (2/4 tests matched)");
    }

    #[test]
    fn zero_amplitude_draws_nothing() {
        let scorer = ConfidenceScorer::new(0.0, ConfidenceThresholds::default());
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(scorer.draw_jitter(&mut rng), 0.0);
        assert_eq!(ConfidenceScorer::new(f64::NAN, ConfidenceThresholds::default()).jitter_amplitude(), 0.0);
        assert_eq!(ConfidenceScorer::new(-0.1, ConfidenceThresholds::default()).jitter_amplitude(), 0.0);
    }

    #[test]
    fn oversized_amplitude_is_capped() {
        let scorer = ConfidenceScorer::new(f64::MAX, ConfidenceThresholds::default());
        assert_eq!(scorer.jitter_amplitude(), MAX_JITTER_AMPLITUDE);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let aggregate = scorer.aggregate(&[Some(quality(4, 1, scorer.draw_jitter(&mut rng)))]);
            assert!((CONFIDENCE_FLOOR..=1.0).contains(&aggregate.aggregate_confidence));
        }
    }

    #[test]
    fn jitter_stays_within_amplitude() {
        let scorer = ConfidenceScorer::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let jitter = scorer.draw_jitter(&mut rng);
            assert!((-DEFAULT_JITTER_AMPLITUDE..=DEFAULT_JITTER_AMPLITUDE).contains(&jitter));
        }
    }
}
