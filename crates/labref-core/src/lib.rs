//! Resolution engine: range selection, classification and confidence scoring.
//!
//! [`Analyzer`] is the entry point. It owns a name index built once over a
//! shared [`labref_kb::KnowledgeBase`] and turns an ordered batch of
//! observations into an [`labref_model::AnalysisReport`].

#![deny(unsafe_code)]

pub mod analyzer;
pub mod classify;
pub mod options;
pub mod range;
pub mod score;

pub use crate::analyzer::Analyzer;
pub use crate::classify::{ClassifyOutcome, classify, classify_detailed};
pub use crate::options::{AnalysisOptions, ConfidenceThresholds, DEFAULT_JITTER_AMPLITUDE};
pub use crate::range::{RangeResolver, RangeSelection};
pub use crate::score::{CONFIDENCE_FLOOR, ConfidenceScorer, ResolvedMatch, ScoreCard, base_quality};
