//! Selection of the single most applicable reference range.
//!
//! Candidates are narrowed by sex, then age, then condition. A step that
//! would leave no candidate is skipped and reported as loosened. The
//! survivors are ranked by source trust (descending), source priority
//! (ascending), effective year (descending, unknown last) and finally
//! `range_id`, which makes the winner unique.

use std::cmp::Ordering;

use labref_kb::KnowledgeBase;
use labref_model::text::eq_ignore_case_trimmed;
use labref_model::{RangeFilter, ReferenceRange, Sex, Source, Subject, TestId};
use tracing::warn;

/// The winning range, its source and the filters skipped to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelection<'a> {
    pub range: &'a ReferenceRange,
    pub source: &'a Source,
    pub loosened: Vec<RangeFilter>,
}

type Candidate<'a> = (&'a ReferenceRange, &'a Source);

#[derive(Debug, Clone, Copy)]
pub struct RangeResolver<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> RangeResolver<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }

    /// Returns `None` only when the test has no reference range at all.
    pub fn resolve(&self, test_id: TestId, subject: &Subject) -> Option<RangeSelection<'a>> {
        let kb = self.kb;
        let mut candidates: Vec<Candidate<'a>> = kb
            .ranges_for(test_id)
            .filter_map(|range| kb.source(range.source_id).map(|source| (range, source)))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let mut loosened = Vec::new();

        // An unknown sex only matches rows that are not sex-specific.
        let sex = subject.sex.unwrap_or_default();
        narrow(&mut candidates, RangeFilter::Sex, &mut loosened, |range| {
            range.sex == Sex::Any || range.sex == sex
        });

        if let Some(age) = subject.age {
            narrow(&mut candidates, RangeFilter::Age, &mut loosened, |range| {
                range.contains_age(age)
            });
        }

        let condition = subject.condition();
        narrow(
            &mut candidates,
            RangeFilter::Condition,
            &mut loosened,
            |range| match (range.condition_tag(), condition) {
                (None, _) => true,
                (Some(tag), Some(wanted)) => eq_ignore_case_trimmed(tag, wanted),
                (Some(_), None) => false,
            },
        );

        if !loosened.is_empty() {
            warn!(%test_id, loosened = ?loosened, "reference range filters loosened");
        }

        let (range, source) = candidates.into_iter().min_by(precedence)?;
        Some(RangeSelection {
            range,
            source,
            loosened,
        })
    }
}

fn narrow<'a>(
    candidates: &mut Vec<Candidate<'a>>,
    filter: RangeFilter,
    loosened: &mut Vec<RangeFilter>,
    keep: impl Fn(&ReferenceRange) -> bool,
) {
    if candidates.iter().any(|(range, _)| keep(*range)) {
        candidates.retain(|(range, _)| keep(*range));
    } else {
        loosened.push(filter);
    }
}

/// Total order over candidates; the smallest wins.
fn precedence(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    let (range_a, source_a) = a;
    let (range_b, source_b) = b;
    source_b
        .trust_level
        .cmp(&source_a.trust_level)
        .then_with(|| range_a.source_priority.cmp(&range_b.source_priority))
        // `Some` sorts above `None`, so a descending compare puts unknown years last.
        .then_with(|| range_b.effective_year.cmp(&range_a.effective_year))
        .then_with(|| range_a.range_id.cmp(&range_b.range_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use labref_model::{RangeId, SourceId, ValueKind};

    fn source(id: u32, trust_level: u8) -> Source {
        Source {
            source_id: SourceId::new(id),
            name: format!("source {id}"),
            source_type: None,
            url: None,
            year: None,
            trust_level,
        }
    }

    fn range(id: u32, priority: u8, year: Option<i32>) -> ReferenceRange {
        ReferenceRange {
            range_id: RangeId::new(id),
            test_id: TestId::new(1),
            source_id: SourceId::new(1),
            unit: None,
            value_type: ValueKind::Numeric,
            ref_low: Some(1.0),
            ref_high: Some(2.0),
            ref_text: None,
            sex: Sex::Any,
            age_min: None,
            age_max: None,
            condition: None,
            source_priority: priority,
            effective_year: year,
        }
    }

    #[test]
    fn precedence_prefers_trust_then_priority_then_year() {
        let trusted = source(1, 5);
        let weaker = source(2, 3);
        let (a, b) = (range(1, 3, None), range(2, 1, Some(2024)));
        assert_eq!(precedence(&(&a, &trusted), &(&b, &weaker)), Ordering::Less);

        let (c, d) = (range(3, 2, Some(2010)), range(4, 1, Some(2000)));
        assert_eq!(precedence(&(&c, &trusted), &(&d, &trusted)), Ordering::Greater);

        let (e, f) = (range(6, 2, Some(2015)), range(5, 2, None));
        assert_eq!(precedence(&(&e, &trusted), &(&f, &trusted)), Ordering::Less);

        let (g, h) = (range(8, 2, Some(2015)), range(7, 2, Some(2015)));
        assert_eq!(precedence(&(&g, &trusted), &(&h, &trusted)), Ordering::Greater);
    }

    #[test]
    fn narrow_skips_filters_that_empty_the_set() {
        let src = source(1, 4);
        let male_only = ReferenceRange {
            sex: Sex::Male,
            ..range(1, 1, None)
        };
        let mut candidates = vec![(&male_only, &src)];
        let mut loosened = Vec::new();
        narrow(&mut candidates, RangeFilter::Sex, &mut loosened, |r| {
            r.sex == Sex::Female
        });
        assert_eq!(candidates.len(), 1);
        assert_eq!(loosened, vec![RangeFilter::Sex]);
    }
}
