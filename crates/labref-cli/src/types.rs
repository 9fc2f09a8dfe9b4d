use std::path::PathBuf;

use labref_kb::{IntegrityViolation, KbCounts};
use labref_map::{NameMatch, Suggestion};
use serde::Serialize;

#[derive(Debug)]
pub struct VerifyResult {
    pub path: PathBuf,
    pub sha256: String,
    pub counts: KbCounts,
    pub violations: Vec<IntegrityViolation>,
}

impl VerifyResult {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct LookupRow {
    pub raw_name: String,
    #[serde(flatten)]
    pub name_match: NameMatch,
    pub canonical_name: Option<String>,
    pub suggestions: Vec<Suggestion>,
}
