//! Tiered lookup from a raw test name to a canonical test.
//!
//! Lookup order, first hit wins:
//! 1. exact canonical name
//! 2. exact short name
//! 3. normalized canonical or short name (canonical entries win)
//! 4. synonym, exact then normalized
//!
//! Exact tiers compare the trimmed input case-sensitively. Every map is
//! filled in ascending `test_id` order, so the lowest id wins a collision.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use labref_kb::KnowledgeBase;
use labref_model::text::{non_blank, normalize_name};
use labref_model::{MatchTier, TestId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::suggest::Candidate;

/// Outcome of resolving one raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NameMatch {
    pub test_id: Option<TestId>,
    pub tier: MatchTier,
}

impl NameMatch {
    pub fn unmatched() -> Self {
        Self {
            test_id: None,
            tier: MatchTier::Unmatched,
        }
    }

    fn found(test_id: TestId, tier: MatchTier) -> Self {
        Self {
            test_id: Some(test_id),
            tier,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.test_id.is_some()
    }
}

/// Precomputed name lookups over one knowledge base.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    canonical: HashMap<String, TestId>,
    short: HashMap<String, TestId>,
    normalized: HashMap<String, TestId>,
    synonym_exact: HashMap<String, TestId>,
    synonym_normalized: HashMap<String, TestId>,
    pub(crate) candidates: Vec<Candidate>,
}

impl NameIndex {
    pub fn build(kb: &KnowledgeBase) -> Self {
        let mut index = Self::default();

        for test in kb.tests() {
            let name = test.canonical_name.trim();
            insert_first(&mut index.canonical, name.to_string(), test.test_id, "canonical");
            insert_first(
                &mut index.normalized,
                normalize_name(name),
                test.test_id,
                "normalized canonical",
            );
            index
                .candidates
                .push(Candidate::new(name, test.test_id, &test.canonical_name));
        }

        for test in kb.tests() {
            let Some(short) = test.short_name() else {
                continue;
            };
            insert_first(&mut index.short, short.to_string(), test.test_id, "short");
            insert_first(
                &mut index.normalized,
                normalize_name(short),
                test.test_id,
                "normalized short",
            );
            index
                .candidates
                .push(Candidate::new(short, test.test_id, &test.canonical_name));
        }

        for test in kb.tests() {
            for synonym in kb.synonyms_for(test.test_id) {
                let Some(alias) = non_blank(Some(synonym.synonym.as_str())) else {
                    continue;
                };
                insert_first(
                    &mut index.synonym_exact,
                    alias.to_string(),
                    test.test_id,
                    "synonym",
                );
                insert_first(
                    &mut index.synonym_normalized,
                    normalize_name(alias),
                    test.test_id,
                    "normalized synonym",
                );
                index
                    .candidates
                    .push(Candidate::new(alias, test.test_id, &test.canonical_name));
            }
        }

        debug!(
            canonical = index.canonical.len(),
            short = index.short.len(),
            synonyms = index.synonym_exact.len(),
            "name index built"
        );
        index
    }

    pub fn resolve(&self, raw: &str) -> NameMatch {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return NameMatch::unmatched();
        }
        if let Some(&test_id) = self.canonical.get(trimmed) {
            return NameMatch::found(test_id, MatchTier::ExactCanonical);
        }
        if let Some(&test_id) = self.short.get(trimmed) {
            return NameMatch::found(test_id, MatchTier::ExactShortName);
        }
        let key = normalize_name(trimmed);
        if let Some(&test_id) = self.normalized.get(&key) {
            return NameMatch::found(test_id, MatchTier::Normalized);
        }
        if let Some(&test_id) = self
            .synonym_exact
            .get(trimmed)
            .or_else(|| self.synonym_normalized.get(&key))
        {
            return NameMatch::found(test_id, MatchTier::Synonym);
        }
        NameMatch::unmatched()
    }
}

fn insert_first(map: &mut HashMap<String, TestId>, key: String, test_id: TestId, kind: &str) {
    if key.is_empty() {
        return;
    }
    match map.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(test_id);
        }
        Entry::Occupied(entry) => {
            let kept = *entry.get();
            if kept != test_id {
                warn!(
                    name = %entry.key(),
                    kind,
                    %kept,
                    ignored = %test_id,
                    "name collision in knowledge base"
                );
            }
        }
    }
}
