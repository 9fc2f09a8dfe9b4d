//! Analysis configuration.

use labref_model::{ConfidenceLevel, Subject};
use serde::{Deserialize, Serialize};

/// Default half-width of the uniform jitter added to each quality score.
pub const DEFAULT_JITTER_AMPLITUDE: f64 = 0.05;

/// Boundaries between aggregate confidence levels.
///
/// - At or above `high`: [`ConfidenceLevel::High`]
/// - `medium` to `high`: [`ConfidenceLevel::Medium`]
/// - Below `medium`: [`ConfidenceLevel::Low`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Minimum aggregate for high confidence (default: 0.70).
    pub high: f64,
    /// Minimum aggregate for medium confidence (default: 0.50).
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.70,
            medium: 0.50,
        }
    }
}

impl ConfidenceThresholds {
    #[must_use]
    pub fn categorize(&self, confidence: f64) -> ConfidenceLevel {
        if confidence >= self.high {
            ConfidenceLevel::High
        } else if confidence >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Half-width of the quality jitter; 0 disables it.
    pub jitter_amplitude: f64,
    pub thresholds: ConfidenceThresholds,
    /// Subject attributes applied where an observation leaves them empty.
    pub default_subject: Subject,
    /// Attach a closest-name suggestion to unmatched observations.
    pub suggest_unmatched: bool,
    pub suggestion_min_score: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            jitter_amplitude: DEFAULT_JITTER_AMPLITUDE,
            thresholds: ConfidenceThresholds::default(),
            default_subject: Subject::default(),
            suggest_unmatched: false,
            suggestion_min_score: labref_map::DEFAULT_MIN_SCORE,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jitter_amplitude(mut self, amplitude: f64) -> Self {
        self.jitter_amplitude = amplitude;
        self
    }

    /// Disables jitter so scores are fully deterministic.
    pub fn without_jitter(self) -> Self {
        self.with_jitter_amplitude(0.0)
    }

    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_default_subject(mut self, subject: Subject) -> Self {
        self.default_subject = subject;
        self
    }

    pub fn with_suggestions(mut self, enable: bool) -> Self {
        self.suggest_unmatched = enable;
        self
    }

    pub fn with_suggestion_min_score(mut self, min_score: f64) -> Self {
        self.suggestion_min_score = min_score;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorize_uses_inclusive_lower_bounds() {
        let thresholds = ConfidenceThresholds::default();
        assert_eq!(thresholds.categorize(0.70), ConfidenceLevel::High);
        assert_eq!(thresholds.categorize(0.6999), ConfidenceLevel::Medium);
        assert_eq!(thresholds.categorize(0.50), ConfidenceLevel::Medium);
        assert_eq!(thresholds.categorize(0.20), ConfidenceLevel::Low);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: AnalysisOptions =
            serde_json::from_str(r#"{"jitter_amplitude": 0.0, "suggest_unmatched": true}"#)
                .unwrap();
        assert_eq!(options.jitter_amplitude, 0.0);
        assert!(options.suggest_unmatched);
        assert_eq!(options.thresholds, ConfidenceThresholds::default());
        assert_eq!(options.suggestion_min_score, labref_map::DEFAULT_MIN_SCORE);
    }
}
