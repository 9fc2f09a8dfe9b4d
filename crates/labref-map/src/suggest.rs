//! Closest-name suggestions for names the index could not resolve.
//!
//! Suggestions are advisory; they never feed back into resolution.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use labref_model::TestId;
use labref_model::text::normalize_name;
use rapidfuzz::distance::jaro_winkler;
use serde::Serialize;

use crate::index::NameIndex;

/// Minimum Jaro-Winkler similarity for a suggestion.
pub const DEFAULT_MIN_SCORE: f64 = 0.85;

/// A known name that can be offered for a raw name.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    normalized: String,
    name: String,
    test_id: TestId,
    canonical_name: String,
}

impl Candidate {
    pub(crate) fn new(name: &str, test_id: TestId, canonical_name: &str) -> Self {
        Self {
            normalized: normalize_name(name),
            name: name.to_string(),
            test_id,
            canonical_name: canonical_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub test_id: TestId,
    pub canonical_name: String,
    /// The canonical name, short name or synonym that scored best.
    pub matched_name: String,
    pub score: f64,
}

impl NameIndex {
    /// Ranks known tests by name similarity to `raw`, best first.
    ///
    /// Each test appears at most once, scored by its closest name.
    pub fn suggest(&self, raw: &str, limit: usize, min_score: f64) -> Vec<Suggestion> {
        let key = normalize_name(raw);
        if key.is_empty() || limit == 0 || min_score.is_nan() {
            return Vec::new();
        }

        let mut best: BTreeMap<TestId, Suggestion> = BTreeMap::new();
        for candidate in &self.candidates {
            let score = jaro_winkler::similarity(key.chars(), candidate.normalized.chars());
            if score < min_score {
                continue;
            }
            let improves = best
                .get(&candidate.test_id)
                .is_none_or(|current| score > current.score);
            if improves {
                best.insert(
                    candidate.test_id,
                    Suggestion {
                        test_id: candidate.test_id,
                        canonical_name: candidate.canonical_name.clone(),
                        matched_name: candidate.name.clone(),
                        score,
                    },
                );
            }
        }

        let mut suggestions: Vec<Suggestion> = best.into_values().collect();
        suggestions.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.test_id.cmp(&b.test_id))
        });
        suggestions.truncate(limit);
        suggestions
    }

    /// Best single suggestion at the default threshold.
    pub fn closest(&self, raw: &str) -> Option<Suggestion> {
        self.suggest(raw, 1, DEFAULT_MIN_SCORE).into_iter().next()
    }
}
